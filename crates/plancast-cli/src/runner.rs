//! Command handlers that drive a plan end to end.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, warn};
use plancast_core::{
    params::CreatePlan, ActivePlan, OperationStatus, PlanConfig, PlanError, RecvError,
    StreamMessage, StreamOutcome, Subscription,
};
use tokio::task::JoinHandle;

use crate::{
    cli::{PlanArgs, ReplayArgs},
    renderer::TerminalRenderer,
    stream::{build_paths, read_stream, SimulatedExecutor},
};

/// Runs CLI commands against fresh plans built from one configuration
pub struct Runner {
    config: PlanConfig,
    renderer: TerminalRenderer,
}

impl Runner {
    pub fn new(config: PlanConfig, renderer: TerminalRenderer) -> Self {
        Self { config, renderer }
    }

    fn start_plan(&self, params: CreatePlan) -> Result<ActivePlan> {
        ActivePlan::builder(params)
            .with_config(self.config)
            .build()
            .context("Failed to start plan")
    }

    /// Replays a recorded stream through a plan with `args.subscribers`
    /// printing subscribers attached.
    pub async fn replay(&self, args: ReplayArgs) -> Result<StreamOutcome> {
        let messages = read_stream(&args.file)?;
        let plan = Arc::new(self.start_plan(args.plan.into())?);
        plan.set_files(build_paths(&messages));

        let mut ids = Vec::with_capacity(args.subscribers);
        let mut printers = Vec::with_capacity(args.subscribers);
        for n in 1..=args.subscribers {
            let subscription = plan.subscribe().context("Failed to subscribe")?;
            ids.push(subscription.id());
            printers.push(spawn_printer(n, subscription));
        }

        let interrupt = {
            let plan = Arc::clone(&plan);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupted, cancelling plan {}", plan.id());
                    plan.cancel();
                }
            })
        };

        let mut executor = SimulatedExecutor::new();
        let mut saw_finished = false;
        for message in &messages {
            executor.observe(&plan, message)?;
            match plan.emit(message).await {
                Ok(()) => {}
                Err(PlanError::Cancelled { .. }) => break,
                Err(err) => return Err(err).context("Failed to emit stream message"),
            }
            if matches!(message, StreamMessage::Finished) {
                saw_finished = true;
                break;
            }
        }

        if !saw_finished && !plan.is_cancelled() {
            warn!("stream ended without a finished message, cancelling plan {}", plan.id());
            plan.cancel();
        }

        let outcome = plan.wait_for_completion().await;
        interrupt.abort();

        for id in ids {
            plan.unsubscribe(id);
        }
        for printer in printers {
            printer.await.context("Subscriber task failed")?;
        }

        self.report(&plan, &outcome)?;
        Ok(outcome)
    }

    /// Two subscribers, one drops out halfway: the second message only
    /// reaches the one still subscribed.
    pub async fn demo(&self, args: PlanArgs) -> Result<StreamOutcome> {
        let plan = self.start_plan(args.into())?;
        let mut a = plan.subscribe().context("Failed to subscribe A")?;
        let mut b = plan.subscribe().context("Failed to subscribe B")?;

        emit_chunk(&plan, "Hello").await?;
        println!("[A] {}", a.recv().await?);
        println!("[B] {}", b.recv().await?);

        plan.unsubscribe(b.id());
        emit_chunk(&plan, "World").await?;
        println!("[A] {}", a.recv().await?);

        plan.emit(&StreamMessage::Finished)
            .await
            .context("Failed to emit finished")?;
        println!("[A] {}", a.recv().await?);

        let outcome = plan.wait_for_completion().await;
        self.report(&plan, &outcome)?;
        Ok(outcome)
    }

    fn report(&self, plan: &ActivePlan, outcome: &StreamOutcome) -> Result<()> {
        println!();
        self.renderer.render(&plan.snapshot().to_string())?;
        print!("{}", OperationStatus::from_outcome(plan.id(), outcome));
        Ok(())
    }
}

async fn emit_chunk(plan: &ActivePlan, text: &str) -> Result<()> {
    plan.record_reply_chunk(text, 1);
    plan.emit(&StreamMessage::chunk(text))
        .await
        .with_context(|| format!("Failed to emit {text:?}"))
}

fn spawn_printer(n: usize, mut subscription: Subscription) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match subscription.recv().await {
                Ok(wire) => println!("[subscriber {n}] {wire}"),
                Err(RecvError::Closed) => break,
                Err(RecvError::Cancelled) => {
                    debug!("subscriber {n} stopped by cancellation");
                    break;
                }
            }
        }
        if subscription.missed() > 0 {
            warn!("subscriber {n} missed {} messages", subscription.missed());
        }
    })
}

//! The active plan: one job's in-memory coordinator.
//!
//! An [`ActivePlan`] ties together everything a running job shares between
//! its producer, its subscribers and its build executor:
//!
//! ```text
//!  producer ──emit──▶ intake ──▶ broadcast loop ──▶ subscriber channels
//!                                     │
//!                                     └──▶ completion latch (once)
//!  executor ──register/mark──▶ build queues ◀── completion queries
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for [`ActivePlan`] instances with channel sizing
//! - `stream_ops`: emit, subscribe, unsubscribe, cancel, completion
//! - `progress_ops`: reply accumulation, build queues and snapshots
//!
//! # Usage
//!
//! ```rust
//! use plancast_core::{ActivePlan, StreamMessage, StreamOutcome};
//!
//! # async fn example() -> plancast_core::Result<()> {
//! let plan = ActivePlan::new("p1", "main", "add a readme");
//! let mut subscription = plan.subscribe()?;
//!
//! plan.emit(&StreamMessage::chunk("Hello")).await?;
//! plan.emit(&StreamMessage::Finished).await?;
//!
//! assert_eq!(subscription.recv().await.unwrap(), r#"{"type":"chunk","text":"Hello"}"#);
//! assert_eq!(plan.wait_for_completion().await, StreamOutcome::Finished);
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

use jiff::Timestamp;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    builds::BuildQueues, completion::CompletionLatch, config::PlanConfig, engine::BroadcastEngine,
    engine::Envelope, params::CreatePlan, subscribers::SubscriberRegistry,
};

pub mod builder;
mod progress_ops;
mod stream_ops;


pub use builder::ActivePlanBuilder;

/// Mutable per-plan aggregate of the producer's progress.
#[derive(Debug, Default)]
struct PlanProgress {
    reply_content: String,
    num_tokens: usize,
    replies_finished: bool,
    prompt_message_num: usize,
    model_stream_id: Option<String>,
    files: Vec<String>,
}

/// Coordinator for one running job.
///
/// Creating a plan spawns its broadcast loop on the current Tokio runtime.
/// Dropping the plan cancels it.
#[derive(Debug)]
pub struct ActivePlan {
    id: String,
    branch: String,
    prompt: String,
    created_at: Timestamp,
    cancel: CancellationToken,
    progress: Mutex<PlanProgress>,
    builds: BuildQueues,
    subscribers: Arc<SubscriberRegistry>,
    completion: Arc<CompletionLatch>,
    intake: mpsc::Sender<Envelope>,
    /// Sequence number of the next emitted message. Held while a message is
    /// queued and while a subscription changes, so both share one order.
    sequence: Mutex<u64>,
    finished_emitted: AtomicBool,
    engine: JoinHandle<()>,
}

impl ActivePlan {
    /// Creates a plan with the default [`PlanConfig`].
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new(id: impl Into<String>, branch: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::start(
            CreatePlan {
                id: id.into(),
                branch: branch.into(),
                prompt: prompt.into(),
            },
            PlanConfig::default(),
        )
    }

    /// Returns a builder for a plan with custom channel sizing.
    pub fn builder(params: CreatePlan) -> ActivePlanBuilder {
        ActivePlanBuilder::from_params(params)
    }

    fn start(params: CreatePlan, config: PlanConfig) -> Self {
        Self::with_engine(params, config, BroadcastEngine::spawn)
    }

    fn with_engine<F>(params: CreatePlan, config: PlanConfig, spawn: F) -> Self
    where
        F: FnOnce(BroadcastEngine) -> JoinHandle<()>,
    {
        let cancel = CancellationToken::new();
        let subscribers = Arc::new(SubscriberRegistry::new(config.subscriber_capacity));
        let completion = Arc::new(CompletionLatch::new());
        let (intake, intake_rx) = mpsc::channel(config.intake_capacity.max(1));

        let engine = spawn(BroadcastEngine {
            plan_id: params.id.clone(),
            intake: intake_rx,
            subscribers: Arc::clone(&subscribers),
            completion: Arc::clone(&completion),
            cancel: cancel.clone(),
        });

        Self {
            id: params.id,
            branch: params.branch,
            prompt: params.prompt,
            created_at: Timestamp::now(),
            cancel,
            progress: Mutex::new(PlanProgress::default()),
            builds: BuildQueues::new(),
            subscribers,
            completion,
            intake,
            sequence: Mutex::new(0),
            finished_emitted: AtomicBool::new(false),
            engine,
        }
    }

    fn sequence(&self) -> MutexGuard<'_, u64> {
        self.sequence
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn progress(&self) -> MutexGuard<'_, PlanProgress> {
        self.progress
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Job id of the plan.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Branch the plan runs on.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Prompt that started the plan.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// When the plan was created.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Token for work derived from this plan. It fires when the plan is
    /// cancelled; cancelling it does not cancel the plan.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    /// Whether the plan was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the broadcast loop is still running.
    pub fn is_broadcasting(&self) -> bool {
        !self.engine.is_finished()
    }
}

impl Drop for ActivePlan {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

//! plancast CLI Application
//!
//! Command-line front end for the plancast plan coordinator.

mod args;
mod cli;
mod renderer;
mod runner;
mod stream;

use anyhow::{bail, Context, Result};
use args::{Args, Commands};
use clap::Parser;
use log::info;
use plancast_core::{PlanConfig, StreamOutcome};
use renderer::TerminalRenderer;
use runner::Runner;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        config,
        no_color,
        subscriber_capacity,
        intake_capacity,
        command,
    } = Args::parse();

    let mut plan_config = match config {
        Some(path) => PlanConfig::load(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PlanConfig::load_default().context("Failed to load config")?,
    };
    if let Some(capacity) = subscriber_capacity {
        plan_config = plan_config.with_subscriber_capacity(capacity);
    }
    if let Some(capacity) = intake_capacity {
        plan_config = plan_config.with_intake_capacity(capacity);
    }

    let runner = Runner::new(plan_config, TerminalRenderer::new(!no_color));

    info!("plancast started");

    let outcome = match command {
        Replay(args) => runner.replay(args).await?,
        Demo(args) => runner.demo(args).await?,
    };

    if let StreamOutcome::Failed(error) = outcome {
        bail!("Plan failed: {error}");
    }
    Ok(())
}

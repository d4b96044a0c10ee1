use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{PlanArgs, ReplayArgs};

/// Drive a plancast plan from the command line
///
/// plancast runs one in-process plan coordinator: it feeds recorded stream
/// messages through the plan's broadcast loop, prints what every subscriber
/// receives, tracks the builds the stream reports and renders the plan's
/// final state.
#[derive(Parser)]
#[command(version, about, name = "plancast")]
pub struct Args {
    /// Path to a JSON config file. Defaults to
    /// $XDG_CONFIG_HOME/plancast/config.json when present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Messages buffered per subscriber before the oldest is dropped
    #[arg(long, global = true)]
    pub subscriber_capacity: Option<usize>,

    /// Messages buffered ahead of the broadcast loop
    #[arg(long, global = true)]
    pub intake_capacity: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the plancast CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Replay a recorded stream (one JSON message per line) through a plan
    #[command(alias = "r")]
    Replay(ReplayArgs),
    /// Run the two-subscriber hello/world walkthrough
    Demo(PlanArgs),
}

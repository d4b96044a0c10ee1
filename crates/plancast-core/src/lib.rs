//! Core library for the plancast job coordinator.
//!
//! One [`ActivePlan`] exists per running job. It accepts messages from the
//! job's producer, fans them out in order to every live subscriber, tracks
//! the builds an external executor runs per target path, and exposes
//! cooperative cancellation plus a single-shot completion signal.
//!
//! # Architecture
//!
//! - [`plan`]: the aggregate and its operations
//! - `engine` (internal): the per-plan broadcast loop
//! - [`subscribers`]: subscriber registry with bounded drop-oldest channels
//! - [`builds`]: per-path build queues and completion queries
//! - [`completion`]: the single-shot completion latch
//! - [`models`]: build records, stream messages, snapshots
//! - [`display`]: markdown rendering of snapshots
//!
//! # Quick Start
//!
//! ```rust
//! use plancast_core::{ActivePlanBuilder, StreamMessage, StreamOutcome, params::RegisterBuild};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let plan = ActivePlanBuilder::new("p1", "main", "add a readme")
//!     .with_subscriber_capacity(32)
//!     .build()?;
//!
//! let mut listener = plan.subscribe()?;
//! plan.emit(&StreamMessage::chunk("Hello")).await?;
//! println!("{}", listener.recv().await?);
//!
//! let build = plan.register_build(&RegisterBuild {
//!     path: "README.md".to_string(),
//!     assistant_message_id: "msg-1".to_string(),
//! });
//! plan.builds().mark_success(&build, "# Readme")?;
//! assert!(plan.build_finished());
//!
//! plan.emit(&StreamMessage::Finished).await?;
//! assert_eq!(plan.wait_for_completion().await, StreamOutcome::Finished);
//! # Ok(())
//! # }
//! ```

pub mod builds;
pub mod completion;
pub mod config;
pub mod display;
mod engine;
pub mod error;
pub mod models;
pub mod params;
pub mod plan;
pub mod subscribers;

// Re-export commonly used types
pub use builds::{BuildHandle, BuildQueues};
pub use completion::CompletionLatch;
pub use config::PlanConfig;
pub use display::OperationStatus;
pub use error::{ApiError, ApiErrorKind, PlanError, Result};
pub use models::{
    BuildOutcome, BuildRecord, BuildSummary, PlanSnapshot, StreamMessage, StreamOutcome,
    WireMessage,
};
pub use params::{CreatePlan, RegisterBuild};
pub use plan::{ActivePlan, ActivePlanBuilder};
pub use subscribers::{RecvError, SubscriberRegistry, Subscription, SubscriptionId};

//! Markdown display of plan state.
//!
//! Domain models implement [`std::fmt::Display`] directly (in [`models`]);
//! the CLI renders the resulting markdown through its terminal renderer.
//!
//! ## Module Organization
//!
//! - [`models`]: Display implementations for snapshots and outcomes
//! - [`status`]: One-line confirmation messages (OperationStatus)
//! - [`datetime`]: Date/time formatting utilities
//!
//! ```rust
//! use plancast_core::{display::OperationStatus, StreamOutcome};
//!
//! let status = OperationStatus::from_outcome("p1", &StreamOutcome::Finished);
//! assert_eq!(status.to_string(), "Success: plan p1 finished\n");
//! ```

pub mod datetime;
pub mod models;
pub mod status;

pub use datetime::LocalDateTime;
pub use status::OperationStatus;

//! Data models for active plans.
//!
//! This module contains the domain models shared by the coordinator and its
//! collaborators: build records and their outcomes, the stream messages
//! fanned out to subscribers, and snapshots of a plan's state. Markdown
//! [`std::fmt::Display`] implementations for snapshots live in
//! [`crate::display`].
//!
//! # Examples
//!
//! ```rust
//! use plancast_core::models::{BuildRecord, StreamMessage, WireMessage};
//!
//! let record = BuildRecord::new("src/main.rs", "msg-1");
//! assert!(!record.is_finished());
//!
//! let wire = StreamMessage::chunk("Hello").to_wire().unwrap();
//! assert_eq!(wire, r#"{"type":"chunk","text":"Hello"}"#);
//! ```

pub mod build;
pub mod message;
pub mod snapshot;
pub mod status;

pub use build::BuildRecord;
pub use message::{StreamMessage, WireMessage};
pub use snapshot::{BuildSummary, PlanSnapshot};
pub use status::{BuildOutcome, StreamOutcome};

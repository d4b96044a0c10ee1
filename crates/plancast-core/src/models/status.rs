//! Outcome enumerations for builds and streams.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Resolution state of a single build record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BuildOutcome {
    /// Build is queued or running
    #[default]
    Pending,

    /// Build applied successfully
    Success,

    /// Build failed with the executor's error message
    Failed { error: String },
}

impl BuildOutcome {
    /// Returns true once the build has resolved either way.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, BuildOutcome::Pending)
    }

    /// Stable lowercase name of the outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildOutcome::Pending => "pending",
            BuildOutcome::Success => "success",
            BuildOutcome::Failed { .. } => "failed",
        }
    }

    /// Get outcome with consistent icon formatting for display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use plancast_core::models::BuildOutcome;
    ///
    /// assert_eq!(BuildOutcome::Success.with_icon(), "✓ Success");
    /// assert_eq!(BuildOutcome::Pending.with_icon(), "○ Pending");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            BuildOutcome::Success => "✓ Success",
            BuildOutcome::Failed { .. } => "✗ Failed",
            BuildOutcome::Pending => "○ Pending",
        }
    }
}

/// Terminal outcome of a plan's stream, delivered once on the completion
/// signal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", content = "error", rename_all = "lowercase")]
pub enum StreamOutcome {
    /// The producer emitted its `finished` message and it was delivered
    Finished,

    /// The stream ended with a terminal fault
    Failed(ApiError),

    /// The plan was cancelled before it finished
    Cancelled,
}

impl StreamOutcome {
    /// The terminal error, if any. `Finished` and `Cancelled` carry none.
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            StreamOutcome::Failed(error) => Some(error),
            StreamOutcome::Finished | StreamOutcome::Cancelled => None,
        }
    }

    /// Stable lowercase name of the outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamOutcome::Finished => "finished",
            StreamOutcome::Failed(_) => "failed",
            StreamOutcome::Cancelled => "cancelled",
        }
    }
}

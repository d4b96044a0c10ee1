//! Confirmation lines for a finished stream.

use std::fmt;

use crate::models::StreamOutcome;

/// Wrapper type for displaying the result of an operation as one line.
pub struct OperationStatus {
    pub message: String,
    pub success: bool,
}

impl OperationStatus {
    /// Create a new success status.
    pub fn success(message: String) -> Self {
        Self {
            message,
            success: true,
        }
    }

    /// Create a new failure status.
    pub fn failure(message: String) -> Self {
        Self {
            message,
            success: false,
        }
    }

    /// Describe how a plan's stream ended. Cancellation is not a failure.
    pub fn from_outcome(plan_id: &str, outcome: &StreamOutcome) -> Self {
        match outcome {
            StreamOutcome::Finished => Self::success(format!("plan {plan_id} finished")),
            StreamOutcome::Cancelled => Self::success(format!("plan {plan_id} was cancelled")),
            StreamOutcome::Failed(error) => {
                Self::failure(format!("plan {plan_id} failed: {error}"))
            }
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", if self.success { "Success:" } else { "Error:" }, self.message)
    }
}

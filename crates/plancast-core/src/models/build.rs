//! Build record model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::BuildOutcome;

/// State of one build operation targeting one path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildRecord {
    /// Target key the build applies to (usually a file path)
    pub path: String,

    /// Id of the assistant message whose reply produced this build
    pub assistant_message_id: String,

    /// Content accumulated by the executor while the build is running
    #[serde(default)]
    pub buffer: String,

    /// Final file content, set when the build succeeds
    pub file_content: Option<String>,

    /// Current outcome; only ever moves away from `Pending` once
    pub outcome: BuildOutcome,

    /// Timestamp when the build was registered (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the build resolved (UTC)
    pub resolved_at: Option<Timestamp>,
}

impl BuildRecord {
    /// Creates a pending record for `path`.
    pub fn new(path: impl Into<String>, assistant_message_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            assistant_message_id: assistant_message_id.into(),
            buffer: String::new(),
            file_content: None,
            outcome: BuildOutcome::Pending,
            created_at: Timestamp::now(),
            resolved_at: None,
        }
    }

    /// Whether the build has resolved (success or failure).
    pub fn is_finished(&self) -> bool {
        self.outcome.is_resolved()
    }

    /// The failure message, if the build failed.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            BuildOutcome::Failed { error } => Some(error),
            _ => None,
        }
    }
}

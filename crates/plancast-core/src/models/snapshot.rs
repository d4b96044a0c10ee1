//! Point-in-time summaries of a plan and its builds.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{BuildOutcome, BuildRecord, StreamOutcome};

/// Summary of one path's build queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildSummary {
    /// Target path
    pub path: String,
    /// Number of builds registered for the path
    pub total: usize,
    /// Number of builds that succeeded
    pub succeeded: usize,
    /// Number of builds that failed
    pub failed: usize,
    /// Outcome of the most recently registered build
    pub latest: BuildOutcome,
}

impl BuildSummary {
    /// Summarizes a path's queue. `records` must be non-empty.
    pub fn from_records(path: &str, records: &[BuildRecord]) -> Self {
        let succeeded = records
            .iter()
            .filter(|record| record.outcome == BuildOutcome::Success)
            .count();
        let failed = records.iter().filter(|record| record.error().is_some()).count();
        Self {
            path: path.to_string(),
            total: records.len(),
            succeeded,
            failed,
            latest: records
                .last()
                .map(|record| record.outcome.clone())
                .unwrap_or_default(),
        }
    }

    /// Number of builds still pending.
    pub fn pending(&self) -> usize {
        self.total - self.succeeded - self.failed
    }
}

/// Snapshot of an active plan's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSnapshot {
    /// Job id
    pub id: String,
    /// Branch the plan runs on
    pub branch: String,
    /// Originating prompt
    pub prompt: String,
    /// Creation timestamp
    pub created_at: Timestamp,
    /// Tokens received from the producer so far
    pub num_tokens: usize,
    /// Accumulated reply text
    pub reply_content: String,
    /// Whether the producer finished emitting replies
    pub replies_finished: bool,
    /// Number of currently registered subscribers
    pub subscribers: usize,
    /// Files the plan touches
    pub files: Vec<String>,
    /// Per-path build summaries, sorted by path
    pub builds: Vec<BuildSummary>,
    /// Whether every registered build resolved
    pub builds_finished: bool,
    /// Terminal outcome, once signaled
    pub outcome: Option<StreamOutcome>,
}

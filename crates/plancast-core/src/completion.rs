//! Single-shot completion signal for a plan's stream.

use log::error;
use tokio::sync::watch;

use crate::{
    error::{PlanError, Result},
    models::StreamOutcome,
};

/// Latch holding the terminal [`StreamOutcome`] of a plan.
///
/// The first write wins; later writes are refused. Any number of tasks may
/// wait for the outcome.
#[derive(Debug)]
pub struct CompletionLatch {
    tx: watch::Sender<Option<StreamOutcome>>,
}

impl Default for CompletionLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionLatch {
    /// Creates an unsignaled latch.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    fn set(&self, outcome: StreamOutcome) -> bool {
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(outcome);
            true
        })
    }

    /// Stores the terminal outcome.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::CompletionAlreadySignaled` if an outcome was
    /// already stored; the stored outcome is left unchanged.
    pub fn signal(&self, outcome: StreamOutcome) -> Result<()> {
        let rejected = outcome.as_str();
        if self.set(outcome) {
            Ok(())
        } else {
            error!(
                "completion already signaled as {:?}, dropping {rejected}",
                self.outcome().map(|o| o.as_str())
            );
            Err(PlanError::CompletionAlreadySignaled)
        }
    }

    /// Stores the outcome unless one is already present. Returns whether it
    /// was stored.
    pub fn signal_if_pending(&self, outcome: StreamOutcome) -> bool {
        self.set(outcome)
    }

    /// The stored outcome, if signaled.
    pub fn outcome(&self) -> Option<StreamOutcome> {
        self.tx.borrow().clone()
    }

    /// Whether an outcome has been stored.
    pub fn is_signaled(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Waits until an outcome is stored and returns it.
    pub async fn wait(&self) -> StreamOutcome {
        let mut rx = self.tx.subscribe();
        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone(),
            // The sender lives as long as `self`, so the channel cannot close
            // while we borrow it.
            Err(_) => None,
        };
        outcome.unwrap_or(StreamOutcome::Cancelled)
    }
}

//! The per-plan broadcast loop.
//!
//! One task per plan drains the intake queue and hands each message to every
//! registered subscriber before taking the next one, so all subscribers see
//! messages in emit order. Cancellation is checked before every dequeue and
//! stops the loop for good.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{debug, error};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    completion::CompletionLatch,
    error::{ApiError, ApiErrorKind},
    models::StreamOutcome,
    subscribers::SubscriberRegistry,
};

/// A serialized message waiting for delivery.
#[derive(Debug)]
pub(crate) struct Envelope {
    /// Position in emit order, starting at 0
    pub(crate) seq: u64,
    pub(crate) wire: String,
    pub(crate) terminal: bool,
}

pub(crate) struct BroadcastEngine {
    pub(crate) plan_id: String,
    pub(crate) intake: mpsc::Receiver<Envelope>,
    pub(crate) subscribers: Arc<SubscriberRegistry>,
    pub(crate) completion: Arc<CompletionLatch>,
    pub(crate) cancel: CancellationToken,
}

impl BroadcastEngine {
    /// Starts the loop on the current Tokio runtime.
    pub(crate) fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        debug!("broadcast loop for plan {} started", self.plan_id);
        loop {
            let envelope = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                envelope = self.intake.recv() => match envelope {
                    Some(envelope) => envelope,
                    None => break,
                },
            };

            let subscribers = Arc::clone(&self.subscribers);
            match deliver_guarded(|| subscribers.deliver(envelope.seq, &envelope.wire)) {
                Ok(delivered) => {
                    debug!("plan {} delivered message to {delivered} subscribers", self.plan_id);
                }
                Err(fault) => {
                    error!("plan {}: {}", self.plan_id, fault.message);
                    self.completion
                        .signal_if_pending(StreamOutcome::Failed(fault));
                    self.cancel.cancel();
                    break;
                }
            }

            if envelope.terminal {
                if let Err(e) = self.completion.signal(StreamOutcome::Finished) {
                    error!("plan {}: {e}", self.plan_id);
                }
            }
        }

        self.subscribers.clear();
        debug!("broadcast loop for plan {} stopped", self.plan_id);
    }
}

/// Runs one delivery, turning a panic into a broadcast fault.
fn deliver_guarded<F>(deliver: F) -> Result<usize, ApiError>
where
    F: FnOnce() -> usize,
{
    panic::catch_unwind(AssertUnwindSafe(deliver)).map_err(|payload| {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        ApiError::new(
            ApiErrorKind::BroadcastFault,
            format!("broadcast loop panicked: {detail}"),
        )
    })
}

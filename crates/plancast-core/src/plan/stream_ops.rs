//! Streaming operations for the ActivePlan.

use std::sync::atomic::Ordering;

use log::{debug, error};

use super::ActivePlan;
use crate::{
    engine::Envelope,
    error::{ApiError, ApiErrorKind, PlanError, Result},
    models::{StreamOutcome, WireMessage},
    subscribers::{Subscription, SubscriptionId},
};

impl ActivePlan {
    /// Serializes `message` and queues it for delivery to every current
    /// subscriber.
    ///
    /// Suspends while the intake queue is full. A terminal message signals
    /// [`StreamOutcome::Finished`] once the broadcast loop has delivered it.
    ///
    /// # Errors
    ///
    /// - `PlanError::Serialization` if the message has no wire form; the
    ///   completion signal then carries a `StreamSerialization` error and
    ///   nothing is delivered.
    /// - `PlanError::AlreadyFinished` for a second terminal message.
    /// - `PlanError::Cancelled` if the plan is or becomes cancelled before the
    ///   message is queued.
    pub async fn emit<M>(&self, message: &M) -> Result<()>
    where
        M: WireMessage + ?Sized,
    {
        if self.cancel.is_cancelled() {
            return Err(PlanError::cancelled(&self.id));
        }

        let wire = match message.to_wire() {
            Ok(wire) => wire,
            Err(source) => {
                let fault = ApiError::new(
                    ApiErrorKind::StreamSerialization,
                    format!("Error marshalling stream message: {source}"),
                );
                // Refused (and logged) by the latch if the stream already ended.
                let _ = self.completion.signal(StreamOutcome::Failed(fault));
                return Err(PlanError::Serialization { source });
            }
        };

        let terminal = message.is_terminal();
        if terminal && self.finished_emitted.swap(true, Ordering::SeqCst) {
            let fault = PlanError::AlreadyFinished {
                plan_id: self.id.clone(),
            };
            error!("{fault}");
            return Err(fault);
        }

        let permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(PlanError::cancelled(&self.id)),
            permit = self.intake.reserve() => {
                permit.map_err(|_| PlanError::cancelled(&self.id))?
            }
        };

        let mut next = self.sequence();
        permit.send(Envelope {
            seq: *next,
            wire,
            terminal,
        });
        *next += 1;
        Ok(())
    }

    /// Registers a new subscriber. It receives every message whose `emit`
    /// returns after this call, and none that were emitted before it.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::Cancelled` if the plan was cancelled.
    pub fn subscribe(&self) -> Result<Subscription> {
        if self.cancel.is_cancelled() {
            return Err(PlanError::cancelled(&self.id));
        }
        let next = self.sequence();
        Ok(self.subscribers.subscribe(self.cancel.child_token(), *next))
    }

    /// Removes a subscriber; unknown ids are ignored. The subscriber still
    /// receives every message emitted before this call, then its
    /// subscription closes.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let next = self.sequence();
        self.subscribers.unsubscribe(id, *next);
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Cancels the plan. Idempotent and never blocks.
    ///
    /// The broadcast loop stops, pending emits and subscriber reads return
    /// with a cancellation, and the completion signal reports
    /// [`StreamOutcome::Cancelled`] unless the stream already ended.
    pub fn cancel(&self) {
        if !self.cancel.is_cancelled() {
            debug!("cancelling plan {}", self.id);
        }
        self.completion
            .signal_if_pending(StreamOutcome::Cancelled);
        self.cancel.cancel();
    }

    /// Waits for the stream's terminal outcome.
    pub async fn wait_for_completion(&self) -> StreamOutcome {
        self.completion.wait().await
    }

    /// The terminal outcome, if the stream already ended.
    pub fn outcome(&self) -> Option<StreamOutcome> {
        self.completion.outcome()
    }
}

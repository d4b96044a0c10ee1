//! Registry of live subscribers and their delivery channels.
//!
//! Each subscriber gets its own bounded [`broadcast`] channel. Sending never
//! blocks: once a subscriber holds `capacity` undelivered messages, the
//! oldest one is overwritten. The subscriber notices the gap on its next
//! [`Subscription::recv`], which skips to the oldest retained message and
//! adds the number of lost messages to [`Subscription::missed`].
//!
//! Subscription changes are ordered against emitted messages by sequence
//! number. An entry receives exactly the messages numbered from the
//! sequence current when it subscribed up to (not including) the sequence
//! current when it unsubscribed, whether or not the broadcast loop has
//! caught up yet.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Unique identity of one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Why a [`Subscription::recv`] returned without a message.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvError {
    /// The plan was cancelled
    #[error("plan cancelled")]
    Cancelled,
    /// The subscription was removed and its buffered messages are drained
    #[error("subscription closed")]
    Closed,
}

/// Receiving half of a subscription.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    rx: broadcast::Receiver<String>,
    cancel: CancellationToken,
    missed: u64,
}

impl Subscription {
    /// Identity to pass to `unsubscribe`.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Number of messages dropped because this subscriber fell behind.
    pub fn missed(&self) -> u64 {
        self.missed
    }

    /// Waits for the next wire message.
    ///
    /// Returns `Err(RecvError::Cancelled)` as soon as the plan is cancelled,
    /// even if messages are still buffered, and `Err(RecvError::Closed)` once
    /// the subscription was removed and every buffered message was read.
    pub async fn recv(&mut self) -> Result<String, RecvError> {
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(RecvError::Cancelled),
                received = self.rx.recv() => match received {
                    Ok(message) => return Ok(message),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("subscriber {} fell behind, dropped {skipped} messages", self.id);
                        self.missed += skipped;
                    }
                    Err(broadcast::error::RecvError::Closed) => return Err(RecvError::Closed),
                },
            }
        }
    }
}

struct Entry {
    id: SubscriptionId,
    tx: broadcast::Sender<String>,
    /// First sequence number this entry receives
    from: u64,
    /// First sequence number this entry no longer receives, once removed
    until: Option<u64>,
}

impl Entry {
    fn wants(&self, seq: u64) -> bool {
        self.from <= seq && self.until.map_or(true, |until| seq < until)
    }

    fn is_active(&self) -> bool {
        self.until.is_none()
    }
}

#[derive(Default)]
struct Entries {
    list: Vec<Entry>,
    /// Sequence number of the next message to be delivered
    delivered: u64,
}

/// Mutex-guarded, insertion-ordered set of subscribers.
pub struct SubscriberRegistry {
    capacity: usize,
    entries: Mutex<Entries>,
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.len())
            .finish()
    }
}

impl SubscriberRegistry {
    /// Creates an empty registry whose channels buffer `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(Entries::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Per-subscriber buffer size.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Registers a new subscriber that receives messages numbered `from`
    /// onwards. Its reads observe `cancel`.
    pub fn subscribe(&self, cancel: CancellationToken, from: u64) -> Subscription {
        let (tx, rx) = broadcast::channel(self.capacity);
        let id = SubscriptionId::new();
        self.lock().list.push(Entry {
            id,
            tx,
            from,
            until: None,
        });
        debug!("subscriber {id} joined at message {from}");
        Subscription {
            id,
            rx,
            cancel,
            missed: 0,
        }
    }

    /// Removes a subscriber so it receives no message numbered `until` or
    /// later. Messages before `until` that are not delivered yet still reach
    /// it. Unknown or already removed ids are ignored. Returns whether an
    /// active entry was removed.
    pub fn unsubscribe(&self, id: SubscriptionId, until: u64) -> bool {
        let mut entries = self.lock();
        let delivered = entries.delivered;
        let Some(position) = entries
            .list
            .iter()
            .position(|entry| entry.id == id && entry.is_active())
        else {
            return false;
        };

        if until <= delivered {
            entries.list.remove(position);
        } else {
            entries.list[position].until = Some(until);
        }
        debug!("subscriber {id} left before message {until}");
        true
    }

    /// Sends message number `seq` to every subscriber that should see it,
    /// in registration order, and returns how many received it.
    ///
    /// Subscribers whose receiver was dropped are pruned, and removed
    /// subscribers are released once every message they are owed went out.
    pub fn deliver(&self, seq: u64, message: &str) -> usize {
        let mut entries = self.lock();
        let mut delivered = 0;
        entries.list.retain(|entry| {
            if !entry.wants(seq) {
                return true;
            }
            match entry.tx.send(message.to_owned()) {
                Ok(_) => {
                    delivered += 1;
                    true
                }
                Err(_) => {
                    warn!("pruning subscriber {} with no receiver", entry.id);
                    false
                }
            }
        });

        let next = seq + 1;
        entries.delivered = next;
        entries
            .list
            .retain(|entry| entry.until.map_or(true, |until| until > next));
        delivered
    }

    /// Drops every subscriber. Readers drain what is buffered, then see
    /// `Closed`.
    pub fn clear(&self) {
        self.lock().list.clear();
    }

    /// Number of active subscribers.
    pub fn len(&self) -> usize {
        self.lock().list.iter().filter(|entry| entry.is_active()).count()
    }

    /// Whether no subscriber is active.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of active subscribers in registration order.
    pub fn ids(&self) -> Vec<SubscriptionId> {
        self.lock()
            .list
            .iter()
            .filter(|entry| entry.is_active())
            .map(|entry| entry.id)
            .collect()
    }
}

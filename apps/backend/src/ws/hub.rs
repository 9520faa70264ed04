use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::RoundState;

/// Why a sink refused a delivered state.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The receiving end is gone; the hub drops the sink.
    #[error("subscriber closed")]
    Closed,
    #[error("subscriber failed: {0}")]
    Failed(String),
}

/// A subscriber callback. Called synchronously on every transition, so it
/// should hand the value off (channel send, actor mailbox) rather than block.
pub type Sink = Arc<dyn Fn(&RoundState) -> Result<(), SinkError> + Send + Sync>;

type Registry = DashMap<Uuid, Sink>;

/// Registry of round-state observers keyed by subscription id.
#[derive(Clone, Default)]
pub struct RoundHub {
    sinks: Arc<Registry>,
}

impl RoundHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, sink: F) -> Subscription
    where
        F: Fn(&RoundState) -> Result<(), SinkError> + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        self.sinks.insert(id, Arc::new(sink));
        debug!(subscriber_id = %id, "round subscriber registered");
        Subscription {
            id,
            sinks: Arc::downgrade(&self.sinks),
        }
    }

    pub fn unsubscribe(&self, id: Uuid) -> bool {
        self.sinks.remove(&id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sinks.len()
    }

    /// Deliver `state` to every sink registered at the moment of the call.
    ///
    /// Each sink runs exactly once. An `Err` or a panic from one sink is
    /// logged and does not affect the others; `SinkError::Closed` also
    /// removes the sink. Returns the number of successful deliveries.
    pub fn broadcast(&self, state: &RoundState) -> usize {
        self.deliver(self.snapshot(), state)
    }

    /// The sinks registered right now. Sinks may (un)subscribe while a
    /// delivery iterates, so deliveries run over a snapshot.
    pub(crate) fn snapshot(&self) -> Vec<(Uuid, Sink)> {
        self.sinks
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect()
    }

    pub(crate) fn deliver(&self, sinks: Vec<(Uuid, Sink)>, state: &RoundState) -> usize {
        let mut delivered = 0;
        for (id, sink) in sinks {
            match catch_unwind(AssertUnwindSafe(|| sink(state))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(SinkError::Closed)) => {
                    debug!(subscriber_id = %id, "round subscriber closed, removing");
                    self.sinks.remove(&id);
                }
                Ok(Err(err)) => {
                    warn!(subscriber_id = %id, error = %err, "round subscriber failed");
                }
                Err(_) => {
                    warn!(subscriber_id = %id, "round subscriber panicked");
                }
            }
        }
        delivered
    }
}

impl std::fmt::Debug for RoundHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundHub")
            .field("subscribers", &self.sinks.len())
            .finish()
    }
}

/// Handle for one registered sink; unsubscribes when dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: Uuid,
    sinks: Weak<Registry>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(sinks) = self.sinks.upgrade() {
            if sinks.remove(&self.id).is_some() {
                debug!(subscriber_id = %self.id, "round subscriber unregistered");
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

//! Process-wide owner of the current round.
//!
//! `set_state` installs a value, broadcasts it and arms the next timed
//! transition; the armed task eventually calls back into the same install
//! path. Every installed value bumps a generation counter. A timed
//! transition captures the generation it was armed under and only installs
//! its successor if that generation is still current, so work that spans
//! store calls can never resurrect a round an operator has since replaced.
//!
//! Observers are called outside the round lock. Installed values queue in an
//! outbox that one thread at a time drains in install order, so a sink may
//! read or even replace the round from inside its callback.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use time::OffsetDateTime;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

use crate::config::round::RoundTimings;
use crate::domain::lifecycle::{self, Successor};
use crate::domain::RoundState;
use crate::services::quiz_store::QuizStore;
use crate::services::scoring;
use crate::ws::hub::{RoundHub, SinkError, Subscription};

struct Slot {
    state: RoundState,
    generation: u64,
    /// The single armed transition, if any.
    pending: Option<AbortHandle>,
}

/// Installed values not yet handed to the hub.
struct Outbox {
    queue: VecDeque<RoundState>,
    draining: bool,
    /// Last value handed to the hub; what a new subscriber starts from.
    delivered: RoundState,
}

struct Inner {
    slot: Mutex<Slot>,
    outbox: Mutex<Outbox>,
    hub: RoundHub,
    store: Arc<dyn QuizStore>,
    timings: RoundTimings,
    runtime: Option<Handle>,
}

/// Facade over the round state, its timers and its observers.
#[derive(Clone)]
pub struct RoundOrchestrator {
    inner: Arc<Inner>,
}

impl RoundOrchestrator {
    /// Starts in `Standby`. Timers run on the tokio runtime current at
    /// construction, or the caller's runtime if there was none.
    pub fn new(store: Arc<dyn QuizStore>, timings: RoundTimings) -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(Slot {
                    state: RoundState::Standby,
                    generation: 0,
                    pending: None,
                }),
                outbox: Mutex::new(Outbox {
                    queue: VecDeque::new(),
                    draining: false,
                    delivered: RoundState::Standby,
                }),
                hub: RoundHub::new(),
                store,
                timings,
                runtime: Handle::try_current().ok(),
            }),
        }
    }

    /// Point-in-time snapshot of the current round.
    pub fn state(&self) -> RoundState {
        self.inner.slot.lock().state.clone()
    }

    pub fn generation(&self) -> u64 {
        self.inner.slot.lock().generation
    }

    /// Whether a timed transition is armed or in flight.
    pub fn has_pending_transition(&self) -> bool {
        self.inner.slot.lock().pending.is_some()
    }

    pub fn timings(&self) -> RoundTimings {
        self.inner.timings
    }

    /// Replace the round, pre-empting any pending timed transition.
    ///
    /// Returns the generation of the installed value.
    pub fn set_state(&self, next: RoundState) -> u64 {
        self.inner.install(next, None).unwrap_or_default()
    }

    /// Register an observer for every future transition.
    pub fn subscribe<F>(&self, sink: F) -> Subscription
    where
        F: Fn(&RoundState) -> Result<(), SinkError> + Send + Sync + 'static,
    {
        self.inner.hub.subscribe(sink)
    }

    /// Register an observer together with the round it starts from, so the
    /// caller neither misses nor duplicates a transition racing with it.
    ///
    /// The snapshot is the last value delivered to observers; anything
    /// installed but still queued reaches the new sink through the hub.
    pub fn subscribe_with_snapshot<F>(&self, sink: F) -> (RoundState, Subscription)
    where
        F: Fn(&RoundState) -> Result<(), SinkError> + Send + Sync + 'static,
    {
        let outbox = self.inner.outbox.lock();
        let subscription = self.inner.hub.subscribe(sink);
        (outbox.delivered.clone(), subscription)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.hub.subscriber_count()
    }
}

impl std::fmt::Debug for RoundOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.inner.slot.lock();
        f.debug_struct("RoundOrchestrator")
            .field("status", &slot.state.status())
            .field("generation", &slot.generation)
            .field("pending", &slot.pending.is_some())
            .field("hub", &self.inner.hub)
            .finish()
    }
}

impl Inner {
    /// Install `next`. With `expected` set, this is a timed transition and
    /// only installs if the generation it was armed under is still current.
    fn install(self: &Arc<Self>, next: RoundState, expected: Option<u64>) -> Option<u64> {
        let mut slot = self.slot.lock();
        match expected {
            Some(expected) if slot.generation != expected => {
                warn!(
                    armed_generation = expected,
                    generation = slot.generation,
                    status = %next.status(),
                    "discarding stale round transition"
                );
                return None;
            }
            // the pending handle belongs to the task running this transition
            Some(_) => slot.pending = None,
            None => {
                if let Some(pending) = slot.pending.take() {
                    pending.abort();
                    debug!(generation = slot.generation, "pending round transition cancelled");
                }
            }
        }

        slot.generation += 1;
        slot.state = next;
        info!(
            status = %slot.state.status(),
            round = slot.state.round(),
            question_id = slot.state.question().map(|q| q.id),
            generation = slot.generation,
            source = if expected.is_some() { "timer" } else { "external" },
            "round state installed"
        );

        // queued under the round lock so the outbox keeps install order
        self.outbox.lock().queue.push_back(slot.state.clone());
        self.arm(&mut slot);
        let generation = slot.generation;
        drop(slot);

        self.drain();
        Some(generation)
    }

    /// Hand queued values to the hub in install order. Whoever finds the
    /// outbox idle drains it; concurrent or nested installs just enqueue.
    fn drain(&self) {
        {
            let mut outbox = self.outbox.lock();
            if outbox.draining {
                return;
            }
            outbox.draining = true;
        }
        loop {
            let (state, sinks) = {
                let mut outbox = self.outbox.lock();
                let Some(state) = outbox.queue.pop_front() else {
                    outbox.draining = false;
                    return;
                };
                outbox.delivered = state.clone();
                (state, self.hub.snapshot())
            };
            self.hub.deliver(sinks, &state);
        }
    }

    fn arm(self: &Arc<Self>, slot: &mut Slot) {
        let Some(step) = lifecycle::next_step(&slot.state, &self.timings) else {
            return;
        };
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            error!(status = %slot.state.status(), "no tokio runtime, round transition not armed");
            return;
        };

        let generation = slot.generation;
        let captured = slot.state.clone();
        let weak: Weak<Inner> = Arc::downgrade(self);
        let task = runtime.spawn(async move {
            tokio::time::sleep(step.dwell).await;
            if let Some(inner) = weak.upgrade() {
                inner.fire(generation, captured, step.successor).await;
            }
        });
        slot.pending = Some(task.abort_handle());
        debug!(generation, dwell_ms = step.dwell.as_millis() as u64, successor = ?step.successor, "round transition armed");
    }

    fn is_current(&self, generation: u64) -> bool {
        self.slot.lock().generation == generation
    }

    /// Compute and install the successor of `captured`. Never fails: store
    /// errors degrade to the safest forward state.
    async fn fire(self: Arc<Self>, generation: u64, captured: RoundState, successor: Successor) {
        if !self.is_current(generation) {
            debug!(generation, "timed transition fired for a replaced round");
            return;
        }

        let next = match successor {
            Successor::Close => lifecycle::close(&captured),
            Successor::Score => match captured.question() {
                Some(question) => {
                    let choices = scoring::score_round(self.store.as_ref(), question).await;
                    lifecycle::reveal(&captured, choices)
                }
                None => None,
            },
            Successor::Advance => Some(self.advance(&captured).await),
        };

        match next {
            Some(next) => {
                self.install(next, Some(generation));
            }
            None => error!(
                status = %captured.status(),
                ?successor,
                "round state has no successor of that kind"
            ),
        }
    }

    async fn advance(&self, captured: &RoundState) -> RoundState {
        let (Some(question), Some(round)) = (captured.question(), captured.round()) else {
            return RoundState::Finished;
        };
        let next_id = lifecycle::next_question_id(question);
        let next = match self.store.find_question(next_id).await {
            Ok(Some(next)) => Some(next),
            Ok(None) => {
                info!(question_id = next_id, "no next question, finishing quiz");
                None
            }
            Err(err) => {
                warn!(question_id = next_id, error = %err, "next question lookup failed, finishing quiz");
                None
            }
        };
        lifecycle::advance(round, next, &self.timings, OffsetDateTime::now_utc())
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(pending) = self.slot.get_mut().pending.take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::*;
    use crate::domain::Question;
    use crate::test_support::memory_store::MemoryQuizStore;

    fn orchestrator() -> RoundOrchestrator {
        RoundOrchestrator::new(Arc::new(MemoryQuizStore::new()), RoundTimings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn stale_timed_install_is_discarded() {
        let orch = orchestrator();
        let armed = orch.set_state(RoundState::Closed {
            question: Question::new(1, "q1"),
            round: 1,
        });
        orch.set_state(RoundState::Standby);

        let installed = orch.inner.install(RoundState::Finished, Some(armed));
        assert_eq!(installed, None);
        assert_eq!(orch.state(), RoundState::Standby);
    }

    #[tokio::test(start_paused = true)]
    async fn generation_bumps_on_every_install() {
        let orch = orchestrator();
        assert_eq!(orch.generation(), 0);
        assert_eq!(orch.set_state(RoundState::Standby), 1);
        assert_eq!(orch.set_state(RoundState::Finished), 2);
        assert!(!orch.has_pending_transition());
    }

    /// Runs `f` on its own thread and fails instead of hanging if it blocks.
    fn within_a_second(f: impl FnOnce() + Send + 'static) {
        let (done_tx, done_rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            f();
            let _ = done_tx.send(());
        });
        done_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("set_state blocked on a subscriber");
    }

    #[test]
    fn subscriber_may_read_the_round_it_is_notified_of() {
        let orch = orchestrator();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (reader, seen_in_sink) = (orch.clone(), Arc::clone(&seen));
        let _sub = orch.subscribe(move |_| {
            seen_in_sink.lock().push((reader.state(), reader.generation()));
            Ok(())
        });

        let writer = orch.clone();
        within_a_second(move || {
            writer.set_state(RoundState::Finished);
        });
        assert_eq!(*seen.lock(), vec![(RoundState::Finished, 1)]);
    }

    #[test]
    fn subscriber_may_replace_the_round_and_everyone_sees_both_in_order() {
        let orch = orchestrator();
        let resetter = orch.clone();
        let _reset_on_finish = orch.subscribe(move |state| {
            if *state == RoundState::Finished {
                resetter.set_state(RoundState::Standby);
            }
            Ok(())
        });
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_sink = Arc::clone(&seen);
        let _watcher = orch.subscribe(move |state| {
            seen_in_sink.lock().push(state.clone());
            Ok(())
        });

        let writer = orch.clone();
        within_a_second(move || {
            writer.set_state(RoundState::Finished);
        });
        assert_eq!(orch.state(), RoundState::Standby);
        assert_eq!(*seen.lock(), vec![RoundState::Finished, RoundState::Standby]);
    }

    #[test]
    fn subscriber_may_subscribe_from_its_callback() {
        let orch = orchestrator();
        let joiner = orch.clone();
        let late = Arc::new(Mutex::new(Vec::new()));
        let late_in_sink = Arc::clone(&late);
        let _sub = orch.subscribe(move |_| {
            let (snapshot, subscription) = joiner.subscribe_with_snapshot(|_| Ok(()));
            late_in_sink.lock().push(snapshot);
            drop(subscription);
            Ok(())
        });

        let writer = orch.clone();
        within_a_second(move || {
            writer.set_state(RoundState::Finished);
        });
        assert_eq!(*late.lock(), vec![RoundState::Finished]);
        assert_eq!(orch.subscriber_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_orchestrator_cancels_its_timer() {
        let store = Arc::new(MemoryQuizStore::new());
        let orch = RoundOrchestrator::new(store, RoundTimings::default());
        let now = OffsetDateTime::now_utc();
        orch.set_state(RoundState::active(Question::new(1, "q1"), 1, 15, now));
        assert!(orch.has_pending_transition());
        drop(orch);
        tokio::time::sleep(Duration::from_secs(60)).await;
    }
}

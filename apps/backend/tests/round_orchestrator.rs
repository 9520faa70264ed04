//! Timed lifecycle, cancellation, staleness and fan-out of the round
//! orchestrator, driven by an in-memory store on paused tokio time.

mod common;
mod support;

use std::sync::Arc;

use parking_lot::Mutex;
use quiz_backend::config::round::RoundTimings;
use quiz_backend::domain::{Choice, Punch, Question, RoundState, RoundStatus};
use quiz_backend::errors::domain::{DomainError, InfraErrorKind};
use quiz_backend::services::round_orchestrator::RoundOrchestrator;
use quiz_backend::test_support::MemoryQuizStore;
use quiz_backend::ws::hub::SinkError;
use support::clock::{advance, secs, settle};
use time::OffsetDateTime;

fn q(id: i64) -> Question {
    Question::new(id, format!("Q{id}"))
}

fn active(id: i64, round: u32) -> RoundState {
    RoundState::active(q(id), round, 15, OffsetDateTime::now_utc())
}

fn orchestrator(store: &MemoryQuizStore) -> RoundOrchestrator {
    RoundOrchestrator::new(Arc::new(store.clone()), RoundTimings::default())
}

/// Collects every state a subscriber is handed.
fn recorder(orch: &RoundOrchestrator) -> (Arc<Mutex<Vec<RoundState>>>, quiz_backend::ws::hub::Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = orch.subscribe(move |state| {
        sink.lock().push(state.clone());
        Ok::<(), SinkError>(())
    });
    (seen, sub)
}

fn statuses(seen: &Mutex<Vec<RoundState>>) -> Vec<RoundStatus> {
    seen.lock().iter().map(RoundState::status).collect()
}

#[tokio::test(start_paused = true)]
async fn state_is_always_the_last_value_set() {
    let orch = orchestrator(&MemoryQuizStore::new());
    assert_eq!(orch.state(), RoundState::Standby);

    let sequence = vec![
        active(1, 1),
        RoundState::Closed {
            question: q(2),
            round: 4,
        },
        RoundState::Finished,
        RoundState::Result {
            question: q(1),
            round: 1,
            correct_choices: vec![Choice::new(3, "C3")],
        },
        RoundState::Standby,
    ];
    for next in sequence {
        orch.set_state(next.clone());
        assert_eq!(orch.state(), next);
    }
}

#[tokio::test(start_paused = true)]
async fn external_set_cancels_the_armed_transition() {
    let store = MemoryQuizStore::new().with_question(1, "Q1");
    let orch = orchestrator(&store);
    let (seen, _sub) = recorder(&orch);

    orch.set_state(active(1, 1));
    assert!(orch.has_pending_transition());
    orch.set_state(RoundState::Standby);
    assert!(!orch.has_pending_transition());

    advance(secs(120)).await;

    assert_eq!(orch.state(), RoundState::Standby);
    assert_eq!(statuses(&seen), vec![RoundStatus::Active, RoundStatus::Standby]);
}

#[tokio::test(start_paused = true)]
async fn active_closes_after_the_answer_window() {
    let orch = orchestrator(&MemoryQuizStore::new());
    orch.set_state(active(3, 2));

    advance(secs(14)).await;
    assert_eq!(orch.state().status(), RoundStatus::Active);

    advance(secs(1)).await;
    assert_eq!(
        orch.state(),
        RoundState::Closed {
            question: q(3),
            round: 2
        }
    );
}

#[tokio::test(start_paused = true)]
async fn scoring_punches_every_winning_card_and_nothing_else() {
    let store = MemoryQuizStore::new()
        .with_question(3, "Q3")
        .with_question(4, "Q4")
        .with_choice(7, "seven")
        .with_choice(8, "eight")
        .with_correct(3, 7)
        .with_card(1)
        .with_card(2)
        .with_card(3)
        .with_card(4)
        .with_answer(10, 1, 3, 7)
        .with_answer(20, 2, 3, 7)
        .with_answer(30, 3, 3, 8);
    let orch = orchestrator(&store);

    orch.set_state(RoundState::Closed {
        question: q(3),
        round: 2,
    });
    advance(secs(5)).await;

    assert_eq!(
        orch.state(),
        RoundState::Result {
            question: q(3),
            round: 2,
            correct_choices: vec![Choice::new(7, "seven")],
        }
    );
    let two: Punch = [2].into_iter().collect();
    assert_eq!(store.punch_of(1), Some(two.clone()));
    assert_eq!(store.punch_of(2), Some(two));
    assert_eq!(store.raw_punch_of(3).as_deref(), Some("[]"));
    assert_eq!(store.raw_punch_of(4).as_deref(), Some("[]"));
    assert_eq!(store.punch_calls(), vec![(1, 2), (2, 2)]);
}

#[tokio::test(start_paused = true)]
async fn shared_card_is_punched_once_per_question() {
    let store = MemoryQuizStore::new()
        .with_question(3, "Q3")
        .with_choice(7, "seven")
        .with_correct(3, 7)
        .with_card(1)
        .with_answer(10, 1, 3, 7)
        .with_answer(11, 1, 3, 7);
    let orch = orchestrator(&store);

    orch.set_state(RoundState::Closed {
        question: q(3),
        round: 1,
    });
    advance(secs(5)).await;

    assert_eq!(store.punch_calls(), vec![(1, 2)]);
}

#[tokio::test(start_paused = true)]
async fn rescoring_an_already_punched_index_changes_nothing() {
    let store = MemoryQuizStore::new()
        .with_question(3, "Q3")
        .with_choice(7, "seven")
        .with_correct(3, 7)
        .with_card_punch(1, "[0,2]")
        .with_answer(10, 1, 3, 7);
    let orch = orchestrator(&store);

    orch.set_state(RoundState::Closed {
        question: q(3),
        round: 1,
    });
    advance(secs(5)).await;

    assert_eq!(store.raw_punch_of(1).as_deref(), Some("[0,2]"));
}

#[tokio::test(start_paused = true)]
async fn malformed_punch_is_treated_as_empty() {
    let store = MemoryQuizStore::new()
        .with_question(3, "Q3")
        .with_choice(7, "seven")
        .with_correct(3, 7)
        .with_card_punch(1, "not json")
        .with_answer(10, 1, 3, 7);
    let orch = orchestrator(&store);

    orch.set_state(RoundState::Closed {
        question: q(3),
        round: 1,
    });
    advance(secs(5)).await;

    assert_eq!(store.raw_punch_of(1).as_deref(), Some("[2]"));
}

#[tokio::test(start_paused = true)]
async fn no_correct_choices_reveals_nothing_and_punches_nothing() {
    let store = MemoryQuizStore::new()
        .with_question(3, "Q3")
        .with_card(1)
        .with_answer(10, 1, 3, 7);
    let orch = orchestrator(&store);

    orch.set_state(RoundState::Closed {
        question: q(3),
        round: 1,
    });
    advance(secs(5)).await;

    assert_eq!(
        orch.state(),
        RoundState::Result {
            question: q(3),
            round: 1,
            correct_choices: vec![],
        }
    );
    assert!(store.punch_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn result_advances_to_the_next_question_with_the_next_round() {
    let store = MemoryQuizStore::new().with_question(5, "Q5").with_question(6, "Q6");
    let orch = orchestrator(&store);

    orch.set_state(RoundState::Result {
        question: q(5),
        round: 4,
        correct_choices: vec![],
    });
    advance(secs(5)).await;

    match orch.state() {
        RoundState::Active {
            question,
            round,
            time_limit_secs,
            ..
        } => {
            assert_eq!(question, q(6));
            assert_eq!(round, 5);
            assert_eq!(time_limit_secs, 15);
        }
        other => panic!("expected active, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn result_without_a_next_question_finishes_and_stays_finished() {
    let store = MemoryQuizStore::new().with_question(5, "Q5");
    let orch = orchestrator(&store);
    let (seen, _sub) = recorder(&orch);

    orch.set_state(RoundState::Result {
        question: q(5),
        round: 4,
        correct_choices: vec![],
    });
    advance(secs(5)).await;
    assert_eq!(orch.state(), RoundState::Finished);
    assert!(!orch.has_pending_transition());

    let generation = orch.generation();
    advance(secs(600)).await;
    assert_eq!(orch.state(), RoundState::Finished);
    assert_eq!(orch.generation(), generation);
    assert_eq!(statuses(&seen), vec![RoundStatus::Result, RoundStatus::Finished]);
}

#[tokio::test(start_paused = true)]
async fn store_failures_degrade_forward_instead_of_stalling() {
    let store = MemoryQuizStore::new()
        .with_question(3, "Q3")
        .with_question(4, "Q4")
        .with_correct(3, 7)
        .with_card(1)
        .with_answer(10, 1, 3, 7);
    store.fail_with(DomainError::infra(InfraErrorKind::DbUnavailable, "down"));
    let orch = orchestrator(&store);

    orch.set_state(RoundState::Closed {
        question: q(3),
        round: 1,
    });
    advance(secs(5)).await;
    assert_eq!(
        orch.state(),
        RoundState::Result {
            question: q(3),
            round: 1,
            correct_choices: vec![],
        }
    );

    // next-question lookup fails too: treated as the end of the quiz
    advance(secs(5)).await;
    assert_eq!(orch.state(), RoundState::Finished);
}

#[tokio::test(start_paused = true)]
async fn not_configured_store_still_reaches_result() {
    let store = MemoryQuizStore::new();
    store.fail_with(DomainError::not_configured());
    let orch = orchestrator(&store);

    orch.set_state(RoundState::Closed {
        question: q(1),
        round: 1,
    });
    advance(secs(5)).await;

    assert_eq!(orch.state().status(), RoundStatus::Result);
}

#[tokio::test(start_paused = true)]
async fn override_during_scoring_discards_the_stale_result() {
    let store = MemoryQuizStore::new()
        .with_question(3, "Q3")
        .with_choice(7, "seven")
        .with_correct(3, 7)
        .with_card(1)
        .with_answer(10, 1, 3, 7);
    let gate = store.hold_scoring();
    let orch = orchestrator(&store);

    orch.set_state(RoundState::Closed {
        question: q(3),
        round: 1,
    });
    advance(secs(5)).await;
    // scoring is parked on its first store read
    assert_eq!(orch.state().status(), RoundStatus::Closed);
    assert!(orch.has_pending_transition());

    orch.set_state(RoundState::Standby);
    let generation = orch.generation();
    gate.add_permits(1);
    settle().await;
    advance(secs(60)).await;

    assert_eq!(orch.state(), RoundState::Standby);
    assert_eq!(orch.generation(), generation);
    assert!(store.punch_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn late_subscriber_receives_the_close_exactly_once() {
    let orch = orchestrator(&MemoryQuizStore::new());
    orch.set_state(active(3, 2));

    advance(secs(5)).await;
    let (seen, _sub) = recorder(&orch);

    advance(secs(10)).await;

    let expected = RoundState::Closed {
        question: q(3),
        round: 2,
    };
    assert_eq!(orch.state(), expected);
    assert_eq!(*seen.lock(), vec![expected]);
}

#[tokio::test(start_paused = true)]
async fn failing_subscribers_do_not_block_the_others() {
    let orch = orchestrator(&MemoryQuizStore::new());
    let _bad = orch.subscribe(|_| Err(SinkError::Failed("boom".into())));
    let _panicky = orch.subscribe(|_| panic!("subscriber bug"));
    let (seen, _sub) = recorder(&orch);

    orch.set_state(RoundState::Finished);
    orch.set_state(RoundState::Standby);

    assert_eq!(statuses(&seen), vec![RoundStatus::Finished, RoundStatus::Standby]);
}

#[tokio::test(start_paused = true)]
async fn dropped_subscription_stops_delivery() {
    let orch = orchestrator(&MemoryQuizStore::new());
    let (seen, sub) = recorder(&orch);
    assert_eq!(orch.subscriber_count(), 1);

    orch.set_state(RoundState::Finished);
    drop(sub);
    assert_eq!(orch.subscriber_count(), 0);
    orch.set_state(RoundState::Standby);

    assert_eq!(statuses(&seen), vec![RoundStatus::Finished]);
}

#[tokio::test(start_paused = true)]
async fn snapshot_subscription_sees_current_state_then_changes() {
    let orch = orchestrator(&MemoryQuizStore::new());
    orch.set_state(RoundState::Finished);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let (snapshot, _sub) = orch.subscribe_with_snapshot(move |s| {
        sink.lock().push(s.status());
        Ok(())
    });
    assert_eq!(snapshot, RoundState::Finished);

    orch.set_state(RoundState::Standby);
    assert_eq!(*seen.lock(), vec![RoundStatus::Standby]);
}

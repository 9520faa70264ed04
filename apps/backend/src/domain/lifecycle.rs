//! The round lifecycle as a table: which states dwell, for how long, and
//! what kind of successor each produces. The orchestrator drives timers off
//! this; nothing here touches a clock or a store.

use std::time::Duration;

use time::OffsetDateTime;

use crate::config::round::RoundTimings;
use crate::domain::round_state::{Choice, Question, RoundState};

/// How the successor of a dwelling state is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Successor {
    /// Active -> Closed, same question and round.
    Close,
    /// Closed -> Result, after scoring the question.
    Score,
    /// Result -> Active for the next question, or Finished.
    Advance,
}

/// The scheduled step armed for a state: wait `dwell`, then compute `successor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub dwell: Duration,
    pub successor: Successor,
}

/// The timed step for `state`, or `None` for states that only move manually.
pub fn next_step(state: &RoundState, timings: &RoundTimings) -> Option<Step> {
    let (dwell, successor) = match state {
        RoundState::Active { .. } => (timings.answer_window, Successor::Close),
        RoundState::Closed { .. } => (timings.closed_dwell, Successor::Score),
        RoundState::Result { .. } => (timings.result_dwell, Successor::Advance),
        RoundState::Standby | RoundState::Finished => return None,
    };
    Some(Step { dwell, successor })
}

/// Active -> Closed. `None` for any other state.
pub fn close(state: &RoundState) -> Option<RoundState> {
    match state {
        RoundState::Active {
            question, round, ..
        } => Some(RoundState::Closed {
            question: question.clone(),
            round: *round,
        }),
        _ => None,
    }
}

/// Closed -> Result with the scored choices. `None` for any other state.
pub fn reveal(state: &RoundState, correct_choices: Vec<Choice>) -> Option<RoundState> {
    match state {
        RoundState::Closed { question, round } => Some(RoundState::Result {
            question: question.clone(),
            round: *round,
            correct_choices,
        }),
        _ => None,
    }
}

/// Id of the question that follows `current`: strictly the next integer.
pub fn next_question_id(current: &Question) -> i64 {
    current.id.saturating_add(1)
}

/// Result -> Active for `next`, or Finished when there is no next question.
pub fn advance(
    round: u32,
    next: Option<Question>,
    timings: &RoundTimings,
    now: OffsetDateTime,
) -> RoundState {
    match next {
        Some(question) => RoundState::active(
            question,
            round.saturating_add(1),
            timings.answer_window_secs(),
            now,
        ),
        None => RoundState::Finished,
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn q(id: i64) -> Question {
        Question::new(id, format!("question {id}"))
    }

    fn timings() -> RoundTimings {
        RoundTimings::default()
    }

    #[test]
    fn table_matches_lifecycle() {
        let now = datetime!(2025-01-01 0:00 UTC);
        let active = RoundState::active(q(1), 1, 15, now);
        let closed = RoundState::Closed {
            question: q(1),
            round: 1,
        };
        let result = RoundState::Result {
            question: q(1),
            round: 1,
            correct_choices: vec![],
        };

        assert_eq!(
            next_step(&active, &timings()),
            Some(Step {
                dwell: Duration::from_secs(15),
                successor: Successor::Close
            })
        );
        assert_eq!(
            next_step(&closed, &timings()),
            Some(Step {
                dwell: Duration::from_secs(5),
                successor: Successor::Score
            })
        );
        assert_eq!(
            next_step(&result, &timings()),
            Some(Step {
                dwell: Duration::from_secs(5),
                successor: Successor::Advance
            })
        );
        assert_eq!(next_step(&RoundState::Standby, &timings()), None);
        assert_eq!(next_step(&RoundState::Finished, &timings()), None);
    }

    #[test]
    fn close_keeps_question_and_round() {
        let active = RoundState::active(q(3), 2, 15, datetime!(2025-01-01 0:00 UTC));
        assert_eq!(
            close(&active),
            Some(RoundState::Closed {
                question: q(3),
                round: 2
            })
        );
        assert_eq!(close(&RoundState::Standby), None);
    }

    #[test]
    fn reveal_only_from_closed() {
        let closed = RoundState::Closed {
            question: q(3),
            round: 2,
        };
        let choices = vec![Choice::new(7, "seven")];
        assert_eq!(
            reveal(&closed, choices.clone()),
            Some(RoundState::Result {
                question: q(3),
                round: 2,
                correct_choices: choices.clone()
            })
        );
        assert_eq!(reveal(&RoundState::Finished, choices), None);
    }

    #[test]
    fn advance_increments_round_or_finishes() {
        let now = datetime!(2025-01-01 0:00 UTC);
        assert_eq!(next_question_id(&q(5)), 6);
        assert_eq!(
            advance(4, Some(q(6)), &timings(), now),
            RoundState::active(q(6), 5, 15, now)
        );
        assert_eq!(advance(4, None, &timings(), now), RoundState::Finished);
    }
}

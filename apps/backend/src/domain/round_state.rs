use std::fmt;

use time::OffsetDateTime;

/// A question as shown to participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: i64,
    pub text: String,
}

impl Question {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// An answer option. Same shape as [`Question`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: i64,
    pub text: String,
}

impl Choice {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// The single current value of the quiz round.
///
/// Values are replaced wholesale on every transition and never mutated in
/// place; holders of a clone own an immutable snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundState {
    /// No active round.
    Standby,
    /// Answering window open until `deadline`.
    Active {
        question: Question,
        round: u32,
        time_limit_secs: u32,
        deadline: OffsetDateTime,
    },
    /// Answering window elapsed, scoring pending.
    Closed { question: Question, round: u32 },
    /// Scoring complete; `correct_choices` ordered by id ascending.
    Result {
        question: Question,
        round: u32,
        correct_choices: Vec<Choice>,
    },
    /// No further question exists.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundStatus {
    Standby,
    Active,
    Closed,
    Result,
    Finished,
}

impl RoundStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            RoundStatus::Standby => "standby",
            RoundStatus::Active => "active",
            RoundStatus::Closed => "closed",
            RoundStatus::Result => "result",
            RoundStatus::Finished => "finished",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "standby" => Some(RoundStatus::Standby),
            "active" => Some(RoundStatus::Active),
            "closed" => Some(RoundStatus::Closed),
            "result" => Some(RoundStatus::Result),
            "finished" => Some(RoundStatus::Finished),
            _ => None,
        }
    }
}

impl fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RoundState {
    /// Opens `question` for answering, with the deadline `time_limit_secs` after `now`.
    pub fn active(question: Question, round: u32, time_limit_secs: u32, now: OffsetDateTime) -> Self {
        RoundState::Active {
            question,
            round,
            time_limit_secs,
            deadline: now + time::Duration::seconds(i64::from(time_limit_secs)),
        }
    }

    pub fn status(&self) -> RoundStatus {
        match self {
            RoundState::Standby => RoundStatus::Standby,
            RoundState::Active { .. } => RoundStatus::Active,
            RoundState::Closed { .. } => RoundStatus::Closed,
            RoundState::Result { .. } => RoundStatus::Result,
            RoundState::Finished => RoundStatus::Finished,
        }
    }

    pub fn question(&self) -> Option<&Question> {
        match self {
            RoundState::Active { question, .. }
            | RoundState::Closed { question, .. }
            | RoundState::Result { question, .. } => Some(question),
            RoundState::Standby | RoundState::Finished => None,
        }
    }

    pub fn round(&self) -> Option<u32> {
        match self {
            RoundState::Active { round, .. }
            | RoundState::Closed { round, .. }
            | RoundState::Result { round, .. } => Some(*round),
            RoundState::Standby | RoundState::Finished => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn active_deadline_is_now_plus_limit() {
        let now = datetime!(2025-01-01 12:00:00 UTC);
        let state = RoundState::active(Question::new(3, "q3"), 2, 15, now);
        match state {
            RoundState::Active { deadline, .. } => {
                assert_eq!(deadline, datetime!(2025-01-01 12:00:15 UTC));
            }
            other => panic!("expected active, got {other:?}"),
        }
    }

    #[test]
    fn accessors_follow_variant() {
        let closed = RoundState::Closed {
            question: Question::new(4, "q4"),
            round: 7,
        };
        assert_eq!(closed.status(), RoundStatus::Closed);
        assert_eq!(closed.question().map(|q| q.id), Some(4));
        assert_eq!(closed.round(), Some(7));

        assert_eq!(RoundState::Finished.question(), None);
        assert_eq!(RoundState::Standby.round(), None);
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            RoundStatus::Standby,
            RoundStatus::Active,
            RoundStatus::Closed,
            RoundStatus::Result,
            RoundStatus::Finished,
        ] {
            assert_eq!(RoundStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RoundStatus::parse("ACTIVE"), None);
    }
}

use serde::{Deserialize, Serialize};

use crate::domain::{Choice, Question, RoundState};

/// `{ "status": "...", "data": { ... } }`; only `active` and `result`
/// carry `data`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum RoundStatePayload {
    Standby,
    Active(ActiveData),
    Closed,
    Result(ResultData),
    Finished,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDto {
    pub id: i64,
    pub context: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceDto {
    pub id: i64,
    pub context: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveData {
    pub question: QuestionDto,
    pub round: u32,
    pub time_limit_sec: u32,
    /// Deadline in whole seconds since the Unix epoch.
    pub ended_at: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultData {
    pub question: QuestionDto,
    pub round: u32,
    pub correct_choice: Vec<ChoiceDto>,
}

impl From<&Question> for QuestionDto {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            context: q.text.clone(),
        }
    }
}

impl From<&Choice> for ChoiceDto {
    fn from(c: &Choice) -> Self {
        Self {
            id: c.id,
            context: c.text.clone(),
        }
    }
}

impl From<&RoundState> for RoundStatePayload {
    fn from(state: &RoundState) -> Self {
        match state {
            RoundState::Standby => RoundStatePayload::Standby,
            RoundState::Active {
                question,
                round,
                time_limit_secs,
                deadline,
            } => RoundStatePayload::Active(ActiveData {
                question: question.into(),
                round: *round,
                time_limit_sec: *time_limit_secs,
                ended_at: deadline.unix_timestamp(),
            }),
            RoundState::Closed { .. } => RoundStatePayload::Closed,
            RoundState::Result {
                question,
                round,
                correct_choices,
            } => RoundStatePayload::Result(ResultData {
                question: question.into(),
                round: *round,
                correct_choice: correct_choices.iter().map(ChoiceDto::from).collect(),
            }),
            RoundState::Finished => RoundStatePayload::Finished,
        }
    }
}

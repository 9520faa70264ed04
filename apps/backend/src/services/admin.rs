//! Moderator actions: resolve content, then drive the orchestrator.

use sea_orm::DatabaseConnection;
use time::OffsetDateTime;
use tracing::info;

use crate::db::txn::with_txn;
use crate::domain::{RoundState, RoundStatus, Seed};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::repos::{answers, cards, choices, questions};
use crate::services::round_orchestrator::RoundOrchestrator;

/// A requested override of the current round.
#[derive(Debug, Clone)]
pub struct StateOverride {
    pub status: String,
    pub question_id: Option<i64>,
    pub round: Option<u32>,
}

/// Open question `question_id` as round `round`.
pub async fn start_round(
    db: &DatabaseConnection,
    orchestrator: &RoundOrchestrator,
    question_id: i64,
    round: u32,
) -> Result<RoundState, AppError> {
    let question = questions::require_by_id(db, question_id).await?;
    let state = RoundState::active(
        question,
        round,
        orchestrator.timings().answer_window_secs(),
        OffsetDateTime::now_utc(),
    );
    orchestrator.set_state(state.clone());
    Ok(state)
}

/// Resolve an override into a concrete state and install it.
///
/// `active` and `result` need a question id. `closed` falls back to the
/// question currently on screen. The round defaults to the current one.
pub async fn override_state(
    db: &DatabaseConnection,
    orchestrator: &RoundOrchestrator,
    request: StateOverride,
) -> Result<RoundState, AppError> {
    let status = RoundStatus::parse(&request.status).ok_or_else(|| {
        AppError::invalid(
            ErrorCode::InvalidStatus,
            format!("Unknown status '{}'", request.status),
        )
    })?;

    let current = orchestrator.state();
    let round = request.round.or(current.round()).unwrap_or(1);

    let next = match status {
        RoundStatus::Standby => RoundState::Standby,
        RoundStatus::Finished => RoundState::Finished,
        RoundStatus::Active => {
            let question = questions::require_by_id(db, require_question_id(&request)?).await?;
            RoundState::active(
                question,
                round,
                orchestrator.timings().answer_window_secs(),
                OffsetDateTime::now_utc(),
            )
        }
        RoundStatus::Closed => {
            let question = match request.question_id {
                Some(id) => questions::require_by_id(db, id).await?,
                None => current.question().cloned().ok_or_else(|| {
                    AppError::invalid(
                        ErrorCode::MissingField,
                        "question.id is required when no question is open",
                    )
                })?,
            };
            RoundState::Closed { question, round }
        }
        RoundStatus::Result => {
            let question = questions::require_by_id(db, require_question_id(&request)?).await?;
            let correct_choices = choices::correct_choices(db, question.id).await?;
            RoundState::Result {
                question,
                round,
                correct_choices,
            }
        }
    };

    orchestrator.set_state(next.clone());
    Ok(next)
}

fn require_question_id(request: &StateOverride) -> Result<i64, AppError> {
    request.question_id.ok_or_else(|| {
        AppError::invalid(
            ErrorCode::MissingField,
            format!("question.id is required for status '{}'", request.status),
        )
    })
}

/// Clear every answer, deal every card a new layout with no marks, and put
/// the round back on standby.
pub async fn reset_all(
    db: &DatabaseConnection,
    orchestrator: &RoundOrchestrator,
) -> Result<RoundState, AppError> {
    let (deleted, reseeded) = with_txn(db, |txn| {
        Box::pin(async move {
            let deleted = answers::delete_all(txn).await?;
            let ids = cards::all_card_ids(txn).await?;
            let seeds: Vec<Seed> = {
                let mut rng = rand::rng();
                ids.iter().map(|_| Seed::shuffled(&mut rng)).collect()
            };
            for (id, seed) in ids.iter().zip(seeds.iter()) {
                cards::reseed_card(txn, *id, seed).await?;
            }
            Ok::<_, AppError>((deleted, ids.len()))
        })
    })
    .await?;

    info!(answers_deleted = deleted, cards_reseeded = reseeded, "quiz reset");
    orchestrator.set_state(RoundState::Standby);
    Ok(RoundState::Standby)
}

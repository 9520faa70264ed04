use sea_orm::DatabaseConnection;
use tracing::debug;

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::repos::{answers, choices, questions, users};

/// Body of an answer submission; `choice_id` may be absent when the
/// participant has not picked anything yet.
#[derive(Debug, Clone, Copy)]
pub struct AnswerSubmission {
    pub user_id: i64,
    pub question_id: i64,
    pub choice_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Recorded,
    /// No choice supplied, nothing stored.
    Skipped,
}

/// Record (or overwrite) the participant's answer for one question.
pub async fn submit_answer(
    db: &DatabaseConnection,
    submission: AnswerSubmission,
) -> Result<AnswerOutcome, AppError> {
    let Some(choice_id) = submission.choice_id else {
        return Ok(AnswerOutcome::Skipped);
    };

    if users::find_user_by_id(db, submission.user_id).await?.is_none() {
        return Err(AppError::not_found(
            ErrorCode::UserNotFound,
            format!("User {} not found", submission.user_id),
        ));
    }
    questions::require_by_id(db, submission.question_id).await?;
    if choices::find_by_id(db, choice_id).await?.is_none() {
        return Err(AppError::not_found(
            ErrorCode::ChoiceNotFound,
            format!("Choice {choice_id} not found"),
        ));
    }

    answers::upsert(db, submission.user_id, submission.question_id, choice_id).await?;
    debug!(
        user_id = submission.user_id,
        question_id = submission.question_id,
        choice_id,
        "answer recorded"
    );
    Ok(AnswerOutcome::Recorded)
}

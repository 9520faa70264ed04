use sea_orm::ConnectionTrait;

use crate::adapters::answers_sea::{self, AnswerUpsert};
use crate::errors::domain::DomainError;

/// One submitted answer joined to the answering user's card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerRecord {
    pub user_id: i64,
    pub card_id: i64,
    pub choice_id: i64,
}

pub async fn answers_for_question<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    question_id: i64,
) -> Result<Vec<AnswerRecord>, DomainError> {
    let rows = answers_sea::answers_with_cards(conn, question_id).await?;
    Ok(rows
        .into_iter()
        .map(|(user_id, card_id, choice_id)| AnswerRecord {
            user_id,
            card_id,
            choice_id,
        })
        .collect())
}

pub async fn upsert<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    question_id: i64,
    choice_id: i64,
) -> Result<(), DomainError> {
    answers_sea::upsert(
        conn,
        AnswerUpsert {
            user_id,
            question_id,
            choice_id,
        },
    )
    .await?;
    Ok(())
}

/// The choice `user_id` submitted for `question_id`, if any.
pub async fn choice_for<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    question_id: i64,
) -> Result<Option<i64>, DomainError> {
    let row = answers_sea::find_for_user_question(conn, user_id, question_id).await?;
    Ok(row.map(|r| r.choice_id))
}

pub async fn delete_all<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<u64, DomainError> {
    Ok(answers_sea::delete_all(conn).await?)
}

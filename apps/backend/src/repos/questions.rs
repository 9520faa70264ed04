use sea_orm::ConnectionTrait;

use crate::adapters::questions_sea;
use crate::domain::Question;
use crate::entities::questions;
use crate::errors::domain::{DomainError, NotFoundKind};

impl From<questions::Model> for Question {
    fn from(model: questions::Model) -> Self {
        Question {
            id: model.id,
            text: model.content,
        }
    }
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Option<Question>, DomainError> {
    let row = questions_sea::find_by_id(conn, id).await?;
    Ok(row.map(Question::from))
}

/// Like [`find_by_id`], but a missing question is an error.
pub async fn require_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Question, DomainError> {
    find_by_id(conn, id)
        .await?
        .ok_or_else(|| DomainError::not_found(NotFoundKind::Question, format!("Question {id} not found")))
}

use sea_orm::ConnectionTrait;

use crate::adapters::choices_sea;
use crate::domain::Choice;
use crate::entities::choices;
use crate::errors::domain::DomainError;

impl From<choices::Model> for Choice {
    fn from(model: choices::Model) -> Self {
        Choice {
            id: model.id,
            text: model.content,
        }
    }
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Option<Choice>, DomainError> {
    Ok(choices_sea::find_by_id(conn, id).await?.map(Choice::from))
}

/// Ascending by id; ids with no row are skipped.
pub async fn find_by_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ids: &[i64],
) -> Result<Vec<Choice>, DomainError> {
    let rows = choices_sea::find_by_ids(conn, ids).await?;
    Ok(rows.into_iter().map(Choice::from).collect())
}

pub async fn find_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<Choice>, DomainError> {
    let rows = choices_sea::find_all(conn).await?;
    Ok(rows.into_iter().map(Choice::from).collect())
}

pub async fn correct_choice_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    question_id: i64,
) -> Result<Vec<i64>, DomainError> {
    Ok(choices_sea::correct_choice_ids(conn, question_id).await?)
}

pub async fn correct_choices<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    question_id: i64,
) -> Result<Vec<Choice>, DomainError> {
    let rows = choices_sea::correct_choices_for_question(conn, question_id).await?;
    Ok(rows.into_iter().map(Choice::from).collect())
}

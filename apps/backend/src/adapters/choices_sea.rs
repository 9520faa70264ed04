//! SeaORM adapter for choices and the correct-answer relation.

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};

use crate::entities::{choices, correct_answers};

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Option<choices::Model>, sea_orm::DbErr> {
    choices::Entity::find_by_id(id).one(conn).await
}

/// Choices with the given ids, ascending by id. Unknown ids are skipped.
pub async fn find_by_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ids: &[i64],
) -> Result<Vec<choices::Model>, sea_orm::DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    choices::Entity::find()
        .filter(choices::Column::Id.is_in(ids.iter().copied()))
        .order_by_asc(choices::Column::Id)
        .all(conn)
        .await
}

pub async fn find_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<choices::Model>, sea_orm::DbErr> {
    choices::Entity::find()
        .order_by_asc(choices::Column::Id)
        .all(conn)
        .await
}

pub async fn correct_choice_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    question_id: i64,
) -> Result<Vec<i64>, sea_orm::DbErr> {
    correct_answers::Entity::find()
        .select_only()
        .column(correct_answers::Column::ChoiceId)
        .filter(correct_answers::Column::QuestionId.eq(question_id))
        .order_by_asc(correct_answers::Column::ChoiceId)
        .into_tuple::<i64>()
        .all(conn)
        .await
}

/// Correct choices for a question joined to their text, ascending by id.
pub async fn correct_choices_for_question<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    question_id: i64,
) -> Result<Vec<choices::Model>, sea_orm::DbErr> {
    choices::Entity::find()
        .join(JoinType::InnerJoin, choices::Relation::CorrectAnswers.def())
        .filter(correct_answers::Column::QuestionId.eq(question_id))
        .order_by_asc(choices::Column::Id)
        .all(conn)
        .await
}

//! SeaORM adapter for submitted answers.

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set,
};

use crate::entities::{user_answers, users};

pub mod dto;

pub use dto::AnswerUpsert;

/// Insert or overwrite the answer for (user, question).
pub async fn upsert<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: AnswerUpsert,
) -> Result<(), sea_orm::DbErr> {
    let row = user_answers::ActiveModel {
        user_id: Set(dto.user_id),
        question_id: Set(dto.question_id),
        choice_id: Set(dto.choice_id),
        updated_at: Set(time::OffsetDateTime::now_utc()),
    };

    user_answers::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([user_answers::Column::UserId, user_answers::Column::QuestionId])
                .update_columns([user_answers::Column::ChoiceId, user_answers::Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

pub async fn find_for_user_question<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    question_id: i64,
) -> Result<Option<user_answers::Model>, sea_orm::DbErr> {
    user_answers::Entity::find_by_id((user_id, question_id))
        .one(conn)
        .await
}

/// `(user_id, card_id, choice_id)` for every answer to `question_id`.
pub async fn answers_with_cards<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    question_id: i64,
) -> Result<Vec<(i64, i64, i64)>, sea_orm::DbErr> {
    user_answers::Entity::find()
        .select_only()
        .column(user_answers::Column::UserId)
        .column(users::Column::BingoCardId)
        .column(user_answers::Column::ChoiceId)
        .join(JoinType::InnerJoin, user_answers::Relation::User.def())
        .filter(user_answers::Column::QuestionId.eq(question_id))
        .order_by_asc(user_answers::Column::UserId)
        .into_tuple::<(i64, i64, i64)>()
        .all(conn)
        .await
}

pub async fn delete_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<u64, sea_orm::DbErr> {
    let res = user_answers::Entity::delete_many().exec(conn).await?;
    Ok(res.rows_affected)
}

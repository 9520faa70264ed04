//! SeaORM adapter for questions.

use sea_orm::{ConnectionTrait, EntityTrait};

use crate::entities::questions;

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Option<questions::Model>, sea_orm::DbErr> {
    questions::Entity::find_by_id(id).one(conn).await
}

use sea_orm::ConnectionTrait;

use crate::adapters::users_sea;
use crate::entities::users;
use crate::errors::domain::DomainError;

/// Quiz participant.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub bingo_card_id: i64,
    pub created_at: time::OffsetDateTime,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            bingo_card_id: model.bingo_card_id,
            created_at: model.created_at,
        }
    }
}

pub async fn create_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    username: &str,
    bingo_card_id: i64,
) -> Result<User, DomainError> {
    let user = users_sea::create(conn, username, bingo_card_id).await?;
    Ok(User::from(user))
}

pub async fn find_user_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Option<User>, DomainError> {
    Ok(users_sea::find_by_id(conn, id).await?.map(User::from))
}

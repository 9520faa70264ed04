//! SeaORM adapter for bingo cards.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, DbBackend, EntityTrait,
    NotSet, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::bingo_cards;

pub mod dto;

pub use dto::CardCreate;

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: CardCreate,
) -> Result<bingo_cards::Model, sea_orm::DbErr> {
    bingo_cards::ActiveModel {
        id: NotSet,
        seed: Set(dto.seed),
        punch: Set(dto.punch),
    }
    .insert(conn)
    .await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Option<bingo_cards::Model>, sea_orm::DbErr> {
    bingo_cards::Entity::find_by_id(id).one(conn).await
}

/// Fetch a card row holding an exclusive lock until `txn` ends.
///
/// Postgres issues `SELECT ... FOR UPDATE`. SQLite has no row locks and a
/// deferred transaction only takes the write lock at its first write, so two
/// readers racing to upgrade fail with `SQLITE_BUSY`. A no-op write on the
/// row takes the database write lock before the read; a second writer then
/// waits on the busy timeout instead.
pub async fn lock_by_id(
    txn: &DatabaseTransaction,
    id: i64,
) -> Result<Option<bingo_cards::Model>, sea_orm::DbErr> {
    if txn.get_database_backend() == DbBackend::Sqlite {
        bingo_cards::Entity::update_many()
            .col_expr(
                bingo_cards::Column::Punch,
                Expr::col(bingo_cards::Column::Punch).into(),
            )
            .filter(bingo_cards::Column::Id.eq(id))
            .exec(txn)
            .await?;
    }
    bingo_cards::Entity::find_by_id(id)
        .lock_exclusive()
        .one(txn)
        .await
}

pub async fn update_punch<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    punch: String,
) -> Result<bingo_cards::Model, sea_orm::DbErr> {
    bingo_cards::ActiveModel {
        id: Set(id),
        seed: NotSet,
        punch: Set(punch),
    }
    .update(conn)
    .await
}

pub async fn update_seed_and_punch<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    seed: String,
    punch: String,
) -> Result<bingo_cards::Model, sea_orm::DbErr> {
    bingo_cards::ActiveModel {
        id: Set(id),
        seed: Set(seed),
        punch: Set(punch),
    }
    .update(conn)
    .await
}

pub async fn all_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<i64>, sea_orm::DbErr> {
    bingo_cards::Entity::find()
        .select_only()
        .column(bingo_cards::Column::Id)
        .order_by_asc(bingo_cards::Column::Id)
        .into_tuple::<i64>()
        .all(conn)
        .await
}

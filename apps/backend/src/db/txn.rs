use std::future::Future;
use std::pin::Pin;

use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

/// Execute a closure within a database transaction.
///
/// Commits when the closure returns `Ok`, rolls back when it returns `Err`.
pub async fn with_txn<R, E, F>(db: &DatabaseConnection, f: F) -> Result<R, E>
where
    F: for<'c> FnOnce(
            &'c DatabaseTransaction,
        ) -> Pin<Box<dyn Future<Output = Result<R, E>> + Send + 'c>>
        + Send,
    R: Send,
    E: From<DbErr> + Send,
{
    let txn = db.begin().await?;
    match f(&txn).await {
        Ok(val) => {
            txn.commit().await?;
            Ok(val)
        }
        Err(err) => {
            // Best-effort rollback; preserve original error
            let _ = txn.rollback().await;
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{EntityTrait, PaginatorTrait, Set};

    use super::*;
    use crate::config::db::{DbKind, RuntimeEnv};
    use crate::entities::questions;
    use crate::infra::db::connect_and_migrate;

    async fn memory_db() -> DatabaseConnection {
        connect_and_migrate(RuntimeEnv::Test, DbKind::SqliteMemory)
            .await
            .unwrap()
    }

    fn insert_question(
        txn: &DatabaseTransaction,
        id: i64,
    ) -> impl Future<Output = Result<(), DbErr>> + Send + '_ {
        async move {
            questions::Entity::insert(questions::ActiveModel {
                id: Set(id),
                content: Set(format!("Q{id}")),
            })
            .exec(txn)
            .await?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn ok_commits() {
        let db = memory_db().await;
        let out: Result<i64, DbErr> = with_txn(&db, |txn| {
            Box::pin(async move {
                insert_question(txn, 1).await?;
                Ok(1)
            })
        })
        .await;
        assert_eq!(out.unwrap(), 1);
        assert_eq!(questions::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn err_rolls_back_and_keeps_the_error() {
        let db = memory_db().await;
        let out: Result<(), DbErr> = with_txn(&db, |txn| {
            Box::pin(async move {
                insert_question(txn, 1).await?;
                Err(DbErr::Custom("abort".into()))
            })
        })
        .await;
        assert!(matches!(out, Err(DbErr::Custom(ref msg)) if msg == "abort"));
        assert_eq!(questions::Entity::find().count(&db).await.unwrap(), 0);
    }
}

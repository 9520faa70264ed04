pub mod txn;

use sea_orm::DatabaseConnection;

use crate::error::AppError;
use crate::state::app_state::AppState;

/// Canonical way for handlers to reach the database.
///
/// Returns `AppError::DbUnavailable` (503) when the process runs without a
/// configured database.
pub fn require_db(state: &AppState) -> Result<&DatabaseConnection, AppError> {
    state
        .db()
        .ok_or_else(|| AppError::db_unavailable("DB not configured (set DB_HOST and DB_USER)"))
}

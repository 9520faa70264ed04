use sea_orm::DatabaseConnection;
use tracing::info;

use crate::db::txn::with_txn;
use crate::domain::Seed;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::repos::{cards, users};

pub const MAX_USERNAME_LEN: usize = 64;

/// Register a participant and deal them a fresh card.
///
/// The card and the user are created in one transaction so a failed user
/// insert never leaves an orphaned card behind.
pub async fn sign_up(db: &DatabaseConnection, username: &str) -> Result<users::User, AppError> {
    let username = username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::invalid(
            ErrorCode::MissingField,
            "username is required",
        ));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::invalid(
            ErrorCode::ValidationError,
            format!("username must be at most {MAX_USERNAME_LEN} characters"),
        ));
    }

    let seed = Seed::shuffled(&mut rand::rng());

    let user = with_txn(db, move |txn| {
        Box::pin(async move {
            let card = cards::create_card(txn, &seed).await?;
            let user = users::create_user(txn, &username, card.id).await?;
            Ok::<_, AppError>(user)
        })
    })
    .await?;

    info!(user_id = user.id, card_id = user.bingo_card_id, "participant signed up");
    Ok(user)
}

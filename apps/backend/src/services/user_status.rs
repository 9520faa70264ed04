use sea_orm::DatabaseConnection;

use crate::domain::RoundState;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::repos::{answers, cards, choices, users};

/// What one participant sees next to the round: the board labels, their
/// card, and whether they answered the question currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct UserStatus {
    pub choices: Vec<String>,
    pub seed: Vec<usize>,
    pub punch: Vec<usize>,
    pub answered: bool,
    pub choice_id: Option<i64>,
}

pub async fn user_status(
    db: &DatabaseConnection,
    user_id: i64,
    current: &RoundState,
) -> Result<UserStatus, AppError> {
    let user = users::find_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::UserNotFound, format!("User {user_id} not found")))?;

    let card = cards::find_card(db, user.bingo_card_id).await?.ok_or_else(|| {
        AppError::not_found(
            ErrorCode::CardNotFound,
            format!("Card {} not found", user.bingo_card_id),
        )
    })?;

    let labels = choices::find_all(db)
        .await?
        .into_iter()
        .map(|c| c.text)
        .collect();

    let choice_id = match current.question() {
        Some(question) => answers::choice_for(db, user.id, question.id).await?,
        None => None,
    };

    Ok(UserStatus {
        choices: labels,
        seed: card.seed.cells().to_vec(),
        punch: card.punch.iter().collect(),
        answered: choice_id.is_some(),
        choice_id,
    })
}

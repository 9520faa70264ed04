//! Bingo card repository, including the locked punch read-modify-write.

use sea_orm::{ConnectionTrait, DatabaseConnection};
use tracing::{debug, warn};

use crate::adapters::cards_sea::{self, CardCreate};
use crate::db::txn::with_txn;
use crate::domain::{Punch, PunchOutcome, Seed};
use crate::entities::bingo_cards;
use crate::errors::domain::DomainError;

/// Card as stored, with decoded values.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: i64,
    pub seed: Seed,
    pub punch: Punch,
}

impl From<bingo_cards::Model> for Card {
    fn from(model: bingo_cards::Model) -> Self {
        Self {
            id: model.id,
            seed: Seed::decode(&model.seed),
            punch: Punch::decode(&model.punch),
        }
    }
}

pub async fn create_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seed: &Seed,
) -> Result<Card, DomainError> {
    let row = cards_sea::create(conn, CardCreate::new(seed.encode())).await?;
    Ok(Card::from(row))
}

pub async fn find_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
) -> Result<Option<Card>, DomainError> {
    Ok(cards_sea::find_by_id(conn, id).await?.map(Card::from))
}

pub async fn all_card_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<i64>, DomainError> {
    Ok(cards_sea::all_ids(conn).await?)
}

/// Replace a card's layout and clear its marks.
pub async fn reseed_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i64,
    seed: &Seed,
) -> Result<(), DomainError> {
    cards_sea::update_seed_and_punch(conn, id, seed.encode(), Punch::new().encode()).await?;
    Ok(())
}

/// Mark `index` on card `card_id` in its own transaction.
///
/// The row is read under an exclusive lock, so two writers for the same card
/// never interleave their read-modify-write. A stored punch that cannot be
/// decoded is treated as empty. The row is only written when the index was
/// newly added.
pub async fn punch_card(
    db: &DatabaseConnection,
    card_id: i64,
    index: usize,
) -> Result<PunchOutcome, DomainError> {
    with_txn(db, move |txn| {
        Box::pin(async move {
            let Some(row) = cards_sea::lock_by_id(txn, card_id).await? else {
                warn!(card_id, "card to punch does not exist");
                return Ok(PunchOutcome::CardMissing);
            };

            let seed = Seed::decode(&row.seed);
            let mut punch = Punch::decode(&row.punch);
            let outcome = punch.punch(&seed, index);
            match outcome {
                PunchOutcome::Punched => {
                    cards_sea::update_punch(txn, card_id, punch.encode()).await?;
                    debug!(card_id, index, "card punched");
                }
                PunchOutcome::AlreadyPunched => debug!(card_id, index, "card already punched"),
                PunchOutcome::OutOfRange => {
                    warn!(card_id, index, "punch index outside card seed, skipping")
                }
                PunchOutcome::CardMissing => {}
            }
            Ok::<_, DomainError>(outcome)
        })
    })
    .await
}

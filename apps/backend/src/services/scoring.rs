//! Closed -> Result scoring: find winners, punch their cards, reveal answers.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::domain::{punch_index_for_question, Choice, PunchOutcome, Question};
use crate::errors::domain::DomainError;
use crate::services::quiz_store::QuizStore;

/// What one scoring pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoringReport {
    /// Correct choices ordered by id ascending.
    pub correct_choices: Vec<Choice>,
    /// Outcome per distinct winning card.
    pub cards: BTreeMap<i64, PunchOutcome>,
}

/// Score `question`, degrading to an empty reveal on any store failure.
///
/// Never fails: the lifecycle must reach `Result` even when persistence is
/// down, so errors are logged and an empty choice list is returned.
pub async fn score_round(store: &dyn QuizStore, question: &Question) -> Vec<Choice> {
    match try_score_round(store, question).await {
        Ok(report) => report.correct_choices,
        Err(err) => {
            warn!(question_id = question.id, error = %err, "scoring failed, revealing no answers");
            Vec::new()
        }
    }
}

/// Score `question`, propagating the first store failure.
pub async fn try_score_round(
    store: &dyn QuizStore,
    question: &Question,
) -> Result<ScoringReport, DomainError> {
    let correct_ids: BTreeSet<i64> = store
        .correct_choice_ids(question.id)
        .await?
        .into_iter()
        .collect();
    if correct_ids.is_empty() {
        info!(question_id = question.id, "no correct choices recorded, nothing to punch");
        return Ok(ScoringReport::default());
    }

    let answers = store.winners_for_question(question.id).await?;
    // a card wins at most once per question, however many users share it
    let winning_cards: BTreeSet<i64> = answers
        .iter()
        .filter(|a| correct_ids.contains(&a.choice_id))
        .map(|a| a.card_id)
        .collect();

    let mut cards = BTreeMap::new();
    match punch_index_for_question(question.id) {
        Some(index) => {
            // one card at a time; each punch is its own locked transaction
            for card_id in winning_cards {
                let outcome = store.punch_card(card_id, index).await?;
                cards.insert(card_id, outcome);
            }
        }
        None => warn!(
            question_id = question.id,
            winners = winning_cards.len(),
            "question has no card cell, skipping punches"
        ),
    }

    let ids: Vec<i64> = correct_ids.into_iter().collect();
    let mut correct_choices = store.choices_by_ids(&ids).await?;
    correct_choices.sort_by_key(|c| c.id);

    info!(
        question_id = question.id,
        correct = correct_choices.len(),
        punched = cards.values().filter(|o| **o == PunchOutcome::Punched).count(),
        "round scored"
    );
    Ok(ScoringReport {
        correct_choices,
        cards,
    })
}

//! In-memory `QuizStore` for driving the orchestrator without a database.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::domain::{Choice, Punch, PunchOutcome, Question, Seed, CARD_SIZE};
use crate::errors::domain::DomainError;
use crate::services::quiz_store::{AnswerRecord, QuizStore};

#[derive(Default)]
struct Data {
    questions: BTreeMap<i64, Question>,
    choices: BTreeMap<i64, Choice>,
    correct: BTreeMap<i64, BTreeSet<i64>>,
    /// (user_id, question_id) -> (card_id, choice_id)
    answers: BTreeMap<(i64, i64), (i64, i64)>,
    /// card_id -> (seed, raw punch)
    cards: BTreeMap<i64, (Seed, String)>,
    punch_calls: Vec<(i64, usize)>,
    failure: Option<DomainError>,
}

/// Store backed by maps, with failure injection and a gate that holds
/// scoring at its first read.
#[derive(Clone, Default)]
pub struct MemoryQuizStore {
    data: Arc<Mutex<Data>>,
    gate: Arc<Mutex<Option<Arc<Semaphore>>>>,
}

impl MemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_question(self, id: i64, text: &str) -> Self {
        self.data.lock().questions.insert(id, Question::new(id, text));
        self
    }

    pub fn with_choice(self, id: i64, text: &str) -> Self {
        self.data.lock().choices.insert(id, Choice::new(id, text));
        self
    }

    pub fn with_correct(self, question_id: i64, choice_id: i64) -> Self {
        self.data
            .lock()
            .correct
            .entry(question_id)
            .or_default()
            .insert(choice_id);
        self
    }

    /// Card whose seed is the identity layout `0..CARD_SIZE`, unpunched.
    pub fn with_card(self, id: i64) -> Self {
        self.with_card_punch(id, "[]")
    }

    /// Card with a raw stored punch value, which may be malformed.
    pub fn with_card_punch(self, id: i64, raw_punch: &str) -> Self {
        let seed = Seed::decode(&identity_layout());
        self.data
            .lock()
            .cards
            .insert(id, (seed, raw_punch.to_string()));
        self
    }

    pub fn with_answer(self, user_id: i64, card_id: i64, question_id: i64, choice_id: i64) -> Self {
        self.data
            .lock()
            .answers
            .insert((user_id, question_id), (card_id, choice_id));
        self
    }

    /// Every call fails with `err` until [`clear_failure`](Self::clear_failure).
    pub fn fail_with(&self, err: DomainError) {
        self.data.lock().failure = Some(err);
    }

    pub fn clear_failure(&self) {
        self.data.lock().failure = None;
    }

    /// Block `correct_choice_ids` until permits are added to the returned semaphore.
    pub fn hold_scoring(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn punch_of(&self, card_id: i64) -> Option<Punch> {
        self.data
            .lock()
            .cards
            .get(&card_id)
            .map(|(_, raw)| Punch::decode(raw))
    }

    pub fn raw_punch_of(&self, card_id: i64) -> Option<String> {
        self.data.lock().cards.get(&card_id).map(|(_, raw)| raw.clone())
    }

    pub fn punch_calls(&self) -> Vec<(i64, usize)> {
        self.data.lock().punch_calls.clone()
    }

    fn check(&self) -> Result<(), DomainError> {
        match &self.data.lock().failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn identity_layout() -> String {
    let cells: Vec<String> = (0..CARD_SIZE).map(|c| c.to_string()).collect();
    format!("[{}]", cells.join(","))
}

#[async_trait]
impl QuizStore for MemoryQuizStore {
    async fn find_question(&self, id: i64) -> Result<Option<Question>, DomainError> {
        self.check()?;
        Ok(self.data.lock().questions.get(&id).cloned())
    }

    async fn correct_choice_ids(&self, question_id: i64) -> Result<Vec<i64>, DomainError> {
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        self.check()?;
        Ok(self
            .data
            .lock()
            .correct
            .get(&question_id)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn choices_by_ids(&self, ids: &[i64]) -> Result<Vec<Choice>, DomainError> {
        self.check()?;
        let data = self.data.lock();
        Ok(ids
            .iter()
            .filter_map(|id| data.choices.get(id).cloned())
            .collect())
    }

    async fn winners_for_question(
        &self,
        question_id: i64,
    ) -> Result<Vec<AnswerRecord>, DomainError> {
        self.check()?;
        Ok(self
            .data
            .lock()
            .answers
            .iter()
            .filter(|((_, q), _)| *q == question_id)
            .map(|((user_id, _), (card_id, choice_id))| AnswerRecord {
                user_id: *user_id,
                card_id: *card_id,
                choice_id: *choice_id,
            })
            .collect())
    }

    async fn punch_card(&self, card_id: i64, index: usize) -> Result<PunchOutcome, DomainError> {
        self.check()?;
        let mut data = self.data.lock();
        data.punch_calls.push((card_id, index));
        let Some((seed, raw)) = data.cards.get_mut(&card_id) else {
            return Ok(PunchOutcome::CardMissing);
        };
        let mut punch = Punch::decode(raw);
        let outcome = punch.punch(seed, index);
        if outcome == PunchOutcome::Punched {
            *raw = punch.encode();
        }
        Ok(outcome)
    }
}

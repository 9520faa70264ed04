//! The persistence surface the round orchestrator depends on.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::domain::{Choice, PunchOutcome, Question};
use crate::errors::domain::DomainError;
use crate::repos;
pub use crate::repos::answers::AnswerRecord;

/// Reads and the single card write needed to run rounds.
///
/// Every method fails with `InfraErrorKind::NotConfigured` when no database
/// is configured, which callers must keep distinct from "no rows".
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn find_question(&self, id: i64) -> Result<Option<Question>, DomainError>;

    async fn correct_choice_ids(&self, question_id: i64) -> Result<Vec<i64>, DomainError>;

    /// Ascending by id; unknown ids are skipped.
    async fn choices_by_ids(&self, ids: &[i64]) -> Result<Vec<Choice>, DomainError>;

    /// Every answer to `question_id` joined to the answering user's card.
    async fn winners_for_question(&self, question_id: i64)
        -> Result<Vec<AnswerRecord>, DomainError>;

    /// Locked read-modify-write adding `index` to one card's punch set.
    async fn punch_card(&self, card_id: i64, index: usize) -> Result<PunchOutcome, DomainError>;
}

/// `QuizStore` over the process database connection.
#[derive(Debug, Clone)]
pub struct SeaQuizStore {
    db: Option<DatabaseConnection>,
}

impl SeaQuizStore {
    pub fn new(db: Option<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub fn has_config(&self) -> bool {
        self.db.is_some()
    }

    fn conn(&self) -> Result<&DatabaseConnection, DomainError> {
        self.db.as_ref().ok_or_else(DomainError::not_configured)
    }
}

#[async_trait]
impl QuizStore for SeaQuizStore {
    async fn find_question(&self, id: i64) -> Result<Option<Question>, DomainError> {
        repos::questions::find_by_id(self.conn()?, id).await
    }

    async fn correct_choice_ids(&self, question_id: i64) -> Result<Vec<i64>, DomainError> {
        repos::choices::correct_choice_ids(self.conn()?, question_id).await
    }

    async fn choices_by_ids(&self, ids: &[i64]) -> Result<Vec<Choice>, DomainError> {
        repos::choices::find_by_ids(self.conn()?, ids).await
    }

    async fn winners_for_question(
        &self,
        question_id: i64,
    ) -> Result<Vec<AnswerRecord>, DomainError> {
        repos::answers::answers_for_question(self.conn()?, question_id).await
    }

    async fn punch_card(&self, card_id: i64, index: usize) -> Result<PunchOutcome, DomainError> {
        repos::cards::punch_card(self.conn()?, card_id, index).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_store_reports_not_configured() {
        let store = SeaQuizStore::new(None);
        assert!(!store.has_config());

        let err = store.find_question(1).await.unwrap_err();
        assert!(err.is_not_configured());
        let err = store.punch_card(1, 0).await.unwrap_err();
        assert!(err.is_not_configured());
    }
}

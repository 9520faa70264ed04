//! DTOs for answers_sea adapter.

#[derive(Debug, Clone, Copy)]
pub struct AnswerUpsert {
    pub user_id: i64,
    pub question_id: i64,
    pub choice_id: i64,
}

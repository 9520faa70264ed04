//! DTOs for cards_sea adapter.

/// DTO for creating a bingo card. Both fields are encoded JSON arrays.
#[derive(Debug, Clone)]
pub struct CardCreate {
    pub seed: String,
    pub punch: String,
}

impl CardCreate {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            punch: "[]".to_string(),
        }
    }

    pub fn with_punch(mut self, punch: impl Into<String>) -> Self {
        self.punch = punch.into();
        self
    }
}

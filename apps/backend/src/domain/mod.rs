//! Domain layer: pure quiz types and helpers, no I/O.

pub mod card;
pub mod lifecycle;
pub mod round_state;

#[cfg(test)]
mod tests_props_card;

pub use card::{punch_index_for_question, Punch, PunchOutcome, Seed, CARD_SIZE};
pub use round_state::{Choice, Question, RoundState, RoundStatus};

//! Adapters for external dependencies.

pub mod answers_sea;
pub mod cards_sea;
pub mod choices_sea;
pub mod questions_sea;
pub mod users_sea;

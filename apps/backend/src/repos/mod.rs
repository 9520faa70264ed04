//! Repository functions for the domain layer (generic over ConnectionTrait).

pub mod answers;
pub mod cards;
pub mod choices;
pub mod questions;
pub mod users;

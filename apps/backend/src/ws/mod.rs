//! Realtime push of round transitions.

pub mod hub;
pub mod protocol;
pub mod session;

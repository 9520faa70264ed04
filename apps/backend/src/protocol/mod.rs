//! JSON shapes shared by the polling, streaming and websocket endpoints.

pub mod round_state;

pub use round_state::RoundStatePayload;

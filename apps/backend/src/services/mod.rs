pub mod admin;
pub mod answers;
pub mod quiz_store;
pub mod round_orchestrator;
pub mod scoring;
pub mod signup;
pub mod user_status;

//! Backend test support utilities
//!
//! Shared by the backend's unit and integration tests: one logging bootstrap
//! and assertions for the ProblemDetails error contract.

pub mod logging;
pub mod problem_details;

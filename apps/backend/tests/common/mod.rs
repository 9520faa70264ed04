#![allow(dead_code)]

use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::test;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

// Logging is auto-installed for every test binary that declares `mod common;`
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// `Authorization` header value for the default moderator credentials.
pub fn admin_basic() -> (&'static str, String) {
    basic("admin", "password")
}

pub fn basic(user: &str, pass: &str) -> (&'static str, String) {
    let encoded = STANDARD.encode(format!("{user}:{pass}"));
    ("Authorization", format!("Basic {encoded}"))
}

/// Read a response body as JSON.
pub async fn json_body(resp: ServiceResponse<BoxBody>) -> Value {
    let bytes = test::read_body(resp).await;
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

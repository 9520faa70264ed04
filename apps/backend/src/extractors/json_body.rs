use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest};
use bytes::BytesMut;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Error as JsonError;
use tracing::debug;

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::trace_ctx;

/// Request bodies above this size are rejected before parsing.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// JSON body extractor whose failures render as ProblemDetails.
///
/// A missing content type is accepted; any other non-JSON content type is
/// rejected with `UNSUPPORTED_CONTENT_TYPE`. An empty body parses as `{}` so
/// bodies made only of optional fields may be omitted.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T> JsonBody<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for JsonBody<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> FromRequest for JsonBody<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let mut payload = payload.take();

        // read before the future to avoid borrowing req across await
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("")
            .to_string();

        Box::pin(async move {
            if !is_json_content_type(&content_type) {
                return Err(AppError::bad_request(
                    ErrorCode::UnsupportedContentType,
                    format!("Expected application/json, got '{content_type}'"),
                ));
            }

            let mut body = BytesMut::new();
            while let Some(chunk) = payload.next().await {
                let chunk = chunk.map_err(|e| {
                    debug!(trace_id = %trace_ctx::trace_id(), error = %e, "failed to read request body");
                    AppError::bad_request(ErrorCode::BadRequest, "Failed to read request body")
                })?;
                if body.len() + chunk.len() > MAX_BODY_BYTES {
                    return Err(AppError::bad_request(
                        ErrorCode::BadRequest,
                        "Request body too large",
                    ));
                }
                body.extend_from_slice(&chunk);
            }

            let raw: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
                b"{}"
            } else {
                &body
            };

            let parsed = serde_json::from_slice::<T>(raw).map_err(|e| {
                debug!(
                    trace_id = %trace_ctx::trace_id(),
                    body_size = body.len(),
                    error = %e,
                    "JSON parsing failed"
                );
                AppError::bad_request(ErrorCode::InvalidJson, classify_json_error(&e))
            })?;

            Ok(JsonBody(parsed))
        })
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    essence.is_empty() || essence.eq_ignore_ascii_case("application/json")
}

fn classify_json_error(error: &JsonError) -> String {
    match error.classify() {
        serde_json::error::Category::Syntax => {
            format!("Invalid JSON at line {}", error.line())
        }
        serde_json::error::Category::Eof => "Invalid JSON: unexpected end of input".to_string(),
        serde_json::error::Category::Data => {
            "Invalid JSON: wrong types for one or more fields".to_string()
        }
        serde_json::error::Category::Io => "Invalid JSON: I/O error while reading body".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Pick {
        user_id: i64,
        choice_id: Option<i64>,
    }

    #[derive(Debug, Deserialize)]
    struct Optional {
        round: Option<u32>,
    }

    #[test]
    fn classify_syntax_and_eof() {
        let err = serde_json::from_str::<Pick>(r#"{"user_id": }"#).unwrap_err();
        assert!(classify_json_error(&err).contains("line"));

        let err = serde_json::from_str::<Pick>(r#"{"user_id": 1"#).unwrap_err();
        assert!(classify_json_error(&err).contains("unexpected end of input"));
    }

    #[test]
    fn classify_wrong_types() {
        let err = serde_json::from_str::<Pick>(r#"{"user_id": "x"}"#).unwrap_err();
        assert!(classify_json_error(&err).contains("wrong types"));
    }

    #[test]
    fn content_type_essence() {
        assert!(is_json_content_type(""));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(!is_json_content_type("text/plain"));
    }

    #[actix_web::test]
    async fn parses_body() {
        let (req, mut payload) = TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload(r#"{"user_id": 4, "choice_id": 9}"#)
            .to_http_parts();
        let JsonBody(pick) = JsonBody::<Pick>::from_request(&req, &mut payload)
            .await
            .unwrap();
        assert_eq!(pick.user_id, 4);
        assert_eq!(pick.choice_id, Some(9));
    }

    #[actix_web::test]
    async fn empty_body_reads_as_empty_object() {
        let (req, mut payload) = TestRequest::post().to_http_parts();
        let body = JsonBody::<Optional>::from_request(&req, &mut payload)
            .await
            .unwrap();
        assert_eq!(body.round, None);
    }

    #[actix_web::test]
    async fn rejects_other_content_types() {
        let (req, mut payload) = TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .set_payload("hi")
            .to_http_parts();
        let err = JsonBody::<Optional>::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnsupportedContentType);
    }
}

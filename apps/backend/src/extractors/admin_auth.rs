use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::warn;

use crate::error::AppError;
use crate::state::app_state::AppState;

/// Proof that the request carried the moderator's Basic credentials.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    pub username: String,
}

/// Split a `Basic` Authorization header into `(user, pass)`.
fn parse_basic(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

impl FromRequest for AdminAuth {
    type Error = AppError;
    type Future = std::future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        std::future::ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AdminAuth, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::internal("AppState not available"))?;

    let (user, pass) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_basic)
        .ok_or_else(AppError::unauthorized)?;

    if !state.admin().matches(&user, &pass) {
        warn!(path = %req.path(), "admin credentials rejected");
        return Err(AppError::unauthorized());
    }

    Ok(AdminAuth { username: user })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_header() {
        let encoded = STANDARD.encode("admin:s3cret:with-colon");
        let parsed = parse_basic(&format!("Basic {encoded}")).unwrap();
        assert_eq!(parsed, ("admin".to_string(), "s3cret:with-colon".to_string()));
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(parse_basic("Bearer abc").is_none());
        assert!(parse_basic("Basic !!!").is_none());
        let no_colon = STANDARD.encode("admin");
        assert!(parse_basic(&format!("Basic {no_colon}")).is_none());
    }
}

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::db::require_db;
use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::services::signup::sign_up;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
struct SignupBody {
    #[serde(default)]
    username: String,
}

#[derive(Debug, Serialize)]
struct SignupResponse {
    user_id: i64,
    username: String,
    bingo_card_id: i64,
}

async fn signup(
    body: JsonBody<SignupBody>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let user = sign_up(db, &body.username).await?;
    Ok(HttpResponse::Created().json(SignupResponse {
        user_id: user.id,
        username: user.username,
        bingo_card_id: user.bingo_card_id,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(signup));
}

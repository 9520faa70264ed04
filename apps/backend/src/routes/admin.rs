//! Moderator endpoints. Every handler takes `AdminAuth`, so a missing or
//! wrong Basic header is rejected with 401 before any work happens.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::db::require_db;
use crate::domain::RoundState;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::{AdminAuth, JsonBody};
use crate::protocol::RoundStatePayload;
use crate::services::admin::{override_state, reset_all, start_round, StateOverride};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
struct QuestionRef {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct StartBody {
    question: Option<QuestionRef>,
    question_id: Option<i64>,
    round: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct StateBody {
    status: Option<String>,
    question: Option<QuestionRef>,
    round: Option<u32>,
}

#[derive(Debug, Serialize)]
struct StateEnvelope {
    state: RoundStatePayload,
}

#[derive(Debug, Serialize)]
struct OkEnvelope {
    ok: bool,
    state: RoundStatePayload,
}

impl OkEnvelope {
    fn of(state: &RoundState) -> Self {
        Self {
            ok: true,
            state: RoundStatePayload::from(state),
        }
    }
}

fn valid_question_id(id: i64) -> Result<i64, AppError> {
    if id < 1 {
        return Err(AppError::invalid(
            ErrorCode::InvalidQuestionId,
            format!("Invalid question id {id}"),
        ));
    }
    Ok(id)
}

async fn start(
    _admin: AdminAuth,
    body: JsonBody<StartBody>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let question_id = body
        .question
        .map(|q| q.id)
        .or(body.question_id)
        .unwrap_or(1);
    let question_id = valid_question_id(question_id)?;
    let round = body.round.unwrap_or(1);

    let db = require_db(&app_state)?;
    let state = start_round(db, &app_state.orchestrator(), question_id, round).await?;
    Ok(HttpResponse::Ok().json(OkEnvelope::of(&state)))
}

async fn get_state(_admin: AdminAuth, app_state: web::Data<AppState>) -> HttpResponse {
    let state = app_state.orchestrator().state();
    HttpResponse::Ok().json(StateEnvelope {
        state: RoundStatePayload::from(&state),
    })
}

async fn set_state(
    _admin: AdminAuth,
    body: JsonBody<StateBody>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let status = body
        .status
        .ok_or_else(|| AppError::invalid(ErrorCode::MissingField, "status is required"))?;
    let question_id = body.question.map(|q| valid_question_id(q.id)).transpose()?;

    let db = require_db(&app_state)?;
    let state = override_state(
        db,
        &app_state.orchestrator(),
        StateOverride {
            status,
            question_id,
            round: body.round,
        },
    )
    .await?;
    Ok(HttpResponse::Ok().json(OkEnvelope::of(&state)))
}

async fn reset(_admin: AdminAuth, app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let state = reset_all(db, &app_state.orchestrator()).await?;
    Ok(HttpResponse::Ok().json(OkEnvelope::of(&state)))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/start", web::post().to(start))
        .service(
            web::resource("/state")
                .route(web::get().to(get_state))
                .route(web::post().to(set_state)),
        )
        .route("/reset", web::post().to(reset));
}

use std::convert::Infallible;
use std::time::Duration;

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::{IntervalStream, UnboundedReceiverStream};
use tracing::debug;

use crate::db::require_db;
use crate::domain::RoundState;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::JsonBody;
use crate::protocol::RoundStatePayload;
use crate::services::answers::{submit_answer, AnswerSubmission};
use crate::services::user_status::user_status;
use crate::state::app_state::AppState;
use crate::ws::hub::SinkError;

pub const SSE_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const SSE_HEARTBEAT_FRAME: &[u8] = b": heartbeat\n\n";

#[derive(Debug, Serialize)]
struct Ack {
    ok: bool,
}

async fn polling(app_state: web::Data<AppState>) -> HttpResponse {
    let state = app_state.orchestrator().state();
    HttpResponse::Ok().json(RoundStatePayload::from(&state))
}

fn sse_frame(state: &RoundState) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_string(&RoundStatePayload::from(state))?;
    Ok(Bytes::from(format!("data: {json}\n\n")))
}

/// Server-sent events: the current round on connect, one frame per
/// transition, and a comment line every 30 s to keep proxies from cutting
/// the connection.
async fn stream_events(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let (tx, rx) = mpsc::unbounded_channel::<Bytes>();

    let (snapshot, subscription) = app_state.orchestrator().subscribe_with_snapshot(move |state| {
        let frame = sse_frame(state).map_err(|e| SinkError::Failed(e.to_string()))?;
        tx.send(frame).map_err(|_| SinkError::Closed)
    });
    let first = sse_frame(&snapshot)
        .map_err(|e| AppError::internal(format!("failed to encode round state: {e}")))?;
    debug!(subscriber = %subscription.id(), "sse stream opened");

    let body = event_stream(first, rx, SSE_HEARTBEAT_INTERVAL, subscription);

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream; charset=utf-8"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .insert_header(("x-accel-buffering", "no"))
        .streaming(body))
}

/// `first`, then every queued frame interleaved with a heartbeat comment
/// each `heartbeat_every`. `guard` is dropped with the stream.
fn event_stream<G>(
    first: Bytes,
    frames: mpsc::UnboundedReceiver<Bytes>,
    heartbeat_every: Duration,
    guard: G,
) -> impl Stream<Item = Result<Bytes, Infallible>> + 'static
where
    G: Send + 'static,
{
    let heartbeat = IntervalStream::new(tokio::time::interval_at(
        tokio::time::Instant::now() + heartbeat_every,
        heartbeat_every,
    ))
    .map(|_| Bytes::from_static(SSE_HEARTBEAT_FRAME));

    stream::once(async move { first })
        .chain(stream::select(UnboundedReceiverStream::new(frames), heartbeat))
        .map(move |frame| {
            let _ = &guard;
            Ok(frame)
        })
}

#[derive(Debug, Deserialize)]
struct AnswerBody {
    user_id: Option<i64>,
    question_id: Option<i64>,
    choice_id: Option<i64>,
}

async fn answer(
    body: JsonBody<AnswerBody>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let AnswerBody {
        user_id,
        question_id,
        choice_id,
    } = body.into_inner();
    let (Some(user_id), Some(question_id)) = (user_id, question_id) else {
        return Err(AppError::invalid(
            ErrorCode::MissingField,
            "user_id and question_id are required",
        ));
    };

    let db = require_db(&app_state)?;
    submit_answer(
        db,
        AnswerSubmission {
            user_id,
            question_id,
            choice_id,
        },
    )
    .await?;
    Ok(HttpResponse::Ok().json(Ack { ok: true }))
}

#[derive(Debug, Deserialize)]
struct UserStatusQuery {
    user_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct BingoDto {
    seed: Vec<usize>,
    punch: Vec<usize>,
}

#[derive(Debug, Serialize)]
struct AnswerStatusDto {
    answered: bool,
    choice_id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct UserStatusResponse {
    choices: Vec<String>,
    bingo: BingoDto,
    round_status: AnswerStatusDto,
}

async fn get_user_status(
    query: web::Query<UserStatusQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let raw = query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::invalid(ErrorCode::MissingField, "user_id is required"))?;
    let user_id: i64 = raw.parse().map_err(|_| {
        AppError::bad_request(ErrorCode::BadRequest, "user_id must be an integer")
    })?;

    let db = require_db(&app_state)?;
    let current = app_state.orchestrator().state();
    let status = user_status(db, user_id, &current).await?;

    Ok(HttpResponse::Ok().json(UserStatusResponse {
        choices: status.choices,
        bingo: BingoDto {
            seed: status.seed,
            punch: status.punch,
        },
        round_status: AnswerStatusDto {
            answered: status.answered,
            choice_id: status.choice_id,
        },
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/polling", web::get().to(polling))
        .route("/stream", web::get().to(stream_events))
        .route("/answer", web::post().to(answer))
        .route("/user-status", web::get().to(get_user_status));
}

use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::RoundState;
use crate::protocol::RoundStatePayload;
use crate::services::round_orchestrator::RoundOrchestrator;
use crate::state::app_state::AppState;
use crate::ws::hub::{SinkError, Subscription};
use crate::ws::protocol::{ClientMsg, ErrorCode, ServerMsg, PROTOCOL_VERSION};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session = WsSession::new(Uuid::new_v4(), app_state.orchestrator());
    ws::start(session, &req, stream)
}

/// A round transition delivered from the orchestrator's hub.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct RoundPush(pub RoundState);

pub struct WsSession {
    conn_id: Uuid,
    orchestrator: RoundOrchestrator,
    subscription: Option<Subscription>,
    last_heartbeat: Instant,
}

impl WsSession {
    fn new(conn_id: Uuid, orchestrator: RoundOrchestrator) -> Self {
        Self {
            conn_id,
            orchestrator,
            subscription: None,
            last_heartbeat: Instant::now(),
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_round(ctx: &mut ws::WebsocketContext<Self>, state: &RoundState) {
        Self::send_json(
            ctx,
            &ServerMsg::RoundState {
                round: RoundStatePayload::from(state),
            },
        );
    }

    fn send_error_and_close(
        ctx: &mut ws::WebsocketContext<Self>,
        code: ErrorCode,
        message: impl Into<String>,
    ) {
        let msg = ServerMsg::Error {
            code,
            message: message.into(),
        };
        Self::send_json(ctx, &msg);
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
        ctx.stop();
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(conn_id = %actor.conn_id, "[WS SESSION] heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    /// Subscribe this session and push the current round.
    fn attach(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        if self.subscription.is_some() {
            return;
        }
        let recipient = ctx.address().recipient::<RoundPush>();
        let (snapshot, subscription) = self.orchestrator.subscribe_with_snapshot(move |state| {
            recipient
                .try_send(RoundPush(state.clone()))
                .map_err(|err| match err {
                    SendError::Closed(_) => SinkError::Closed,
                    SendError::Full(_) => SinkError::Failed("session mailbox full".to_string()),
                })
        });
        self.subscription = Some(subscription);
        Self::send_round(ctx, &snapshot);
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, "[WS SESSION] started");
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        // dropping the subscription unregisters the sink
        self.subscription = None;
        info!(conn_id = %self.conn_id, "[WS SESSION] stopped");
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();

                let Ok(cmd) = serde_json::from_str::<ClientMsg>(&text) else {
                    Self::send_error_and_close(ctx, ErrorCode::BadRequest, "Malformed JSON");
                    return;
                };

                match cmd {
                    ClientMsg::Hello { protocol } => {
                        if protocol != PROTOCOL_VERSION {
                            Self::send_error_and_close(
                                ctx,
                                ErrorCode::BadProtocol,
                                "Unsupported protocol version",
                            );
                            return;
                        }
                        Self::send_json(
                            ctx,
                            &ServerMsg::HelloAck {
                                protocol: PROTOCOL_VERSION,
                            },
                        );
                        self.attach(ctx);
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                Self::send_error_and_close(ctx, ErrorCode::BadRequest, "Binary not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(conn_id = %self.conn_id, error = %err, "[WS SESSION] protocol error");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<RoundPush> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: RoundPush, ctx: &mut Self::Context) -> Self::Result {
        Self::send_round(ctx, &msg.0);
    }
}

use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::domain::DomainError;
use crate::services::game_flow::StatePush;
use crate::services::rooms::ConnId;
use crate::state::app_state::AppState;
use crate::ws::hub::StateBroadcast;
use crate::ws::protocol::{error_code, ClientMsg, ErrorCode, ServerMsg};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let conn_id = Uuid::new_v4();
    let session = WsSession::new(conn_id, app_state);
    ws::start(session, &req, stream)
}

pub struct WsSession {
    conn_id: ConnId,
    app_state: web::Data<AppState>,
    last_heartbeat: Instant,
}

impl WsSession {
    fn new(conn_id: ConnId, app_state: web::Data<AppState>) -> Self {
        Self {
            conn_id,
            app_state,
            last_heartbeat: Instant::now(),
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_error_and_close(
        &self,
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

    /// Domain rejections go back to this connection only; the socket stays
    /// open and nothing reaches the other player.
    fn send_rejection(&self, ctx: &mut ws::WebsocketContext<Self>, err: &DomainError) {
        let code = error_code(err);
        warn!(
            conn_id = %self.conn_id,
            code = code.as_str(),
            detail = err.detail(),
            "[WS SESSION] action rejected"
        );
        Self::send_json(
            ctx,
            &ServerMsg::Error {
                code,
                message: err.detail().to_string(),
            },
        );
    }

    fn deliver(&self, pushes: Vec<StatePush>) {
        let hub = self.app_state.ws_registry();
        for (conn, view) in pushes {
            hub.push(conn, view);
        }
    }

    /// Ordering guarantee: the ack goes out before the state pushes.
    fn apply(
        &self,
        ctx: &mut ws::WebsocketContext<Self>,
        ack: &'static str,
        result: Result<Vec<StatePush>, DomainError>,
    ) {
        match result {
            Ok(pushes) => {
                Self::send_json(ctx, &ServerMsg::Ack { message: ack });
                self.deliver(pushes);
            }
            Err(err) => self.send_rejection(ctx, &err),
        }
    }

    fn handle_client_msg(&self, cmd: ClientMsg, ctx: &mut ws::WebsocketContext<Self>) {
        let flow = self.app_state.game_flow();
        match cmd {
            ClientMsg::CreateRoom => {
                let room_id = flow.create_room();
                Self::send_json(ctx, &ServerMsg::RoomCreated { room_id });
            }

            ClientMsg::JoinRoom { room_id, token } => {
                match flow.join_room(&room_id, token.as_deref(), self.conn_id) {
                    Ok((reply, pushes)) => {
                        Self::send_json(
                            ctx,
                            &ServerMsg::RoomJoined {
                                room_id: reply.room_id,
                                token: reply.token,
                                player_index: reply.player_index,
                                reconnected: reply.reconnected,
                            },
                        );
                        self.deliver(pushes);
                    }
                    Err(err) => self.send_rejection(ctx, &err),
                }
            }

            ClientMsg::PlayCard {
                room_id,
                card_id,
                target_pair_index,
            } => {
                let result = flow.play_card(self.conn_id, &room_id, card_id, target_pair_index);
                self.apply(ctx, "played", result);
            }

            ClientMsg::DeclareBeaten { room_id } => {
                let result = flow.declare_beaten(self.conn_id, &room_id);
                self.apply(ctx, "beaten", result);
            }

            ClientMsg::DeclareTake { room_id } => {
                let result = flow.declare_take(self.conn_id, &room_id);
                self.apply(ctx, "taking", result);
            }

            ClientMsg::FinishThrowingIn { room_id } => {
                let result = flow.finish_throwing_in(self.conn_id, &room_id);
                self.apply(ctx, "thrown_in", result);
            }

            ClientMsg::Rematch { room_id } => {
                let result = flow.rematch(self.conn_id, &room_id);
                self.apply(ctx, "rematch", result);
            }
        }
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
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, "[WS SESSION] started");

        let recipient = ctx.address().recipient::<StateBroadcast>();
        self.app_state.ws_registry().register(self.conn_id, recipient);

        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.app_state.ws_registry().unregister(self.conn_id);
        self.app_state.game_flow().handle_disconnect(self.conn_id);
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

                let parsed: Result<ClientMsg, _> = serde_json::from_str(&text);
                let Ok(cmd) = parsed else {
                    self.send_error_and_close(ctx, ErrorCode::BadRequest, "Malformed JSON");
                    return;
                };

                self.handle_client_msg(cmd, ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                self.send_error_and_close(ctx, ErrorCode::BadRequest, "Binary not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Nop) => {
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

impl Handler<StateBroadcast> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: StateBroadcast, ctx: &mut Self::Context) -> Self::Result {
        Self::send_json(ctx, &ServerMsg::GameState { view: msg.view });
    }
}

use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Running, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use actix_web_actors::ws::{CloseCode, CloseReason};
use serde::Deserialize;

use system::{ClientCommand, ConnectionId, ServerEvent, SessionId};

use crate::connection_tx_storage::ConnectionTx;
use crate::server::ServerTx;

const CONNECTION_BUFFER: usize = 64;

#[derive(Debug)]
pub enum ConnectionCommand {
    Connect {
        tx: ConnectionTx,
        /// Joined right away when given at connect time.
        session_id: Option<SessionId>,
    },
    Disconnect {
        from: ConnectionId,
    },
    Command {
        from: ConnectionId,
        command: ClientCommand,
    },
}

#[derive(Debug)]
pub enum ConnectionEvent {
    Connected { connection_id: ConnectionId },
    ServerEvent(ServerEvent),
}

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ConnectionEvent);

enum ConnectionState {
    Idle,
    Connected(ConnectionId),
}

struct ConnectionActor {
    state: ConnectionState,
    srv_tx: ServerTx,
    initial_session_id: Option<SessionId>,
    /// Commands received before the relay assigned an id.
    pending: Vec<ClientCommand>,
}

impl ConnectionActor {
    fn forward(&mut self, command: ClientCommand) {
        match self.state {
            ConnectionState::Connected(from) => {
                if let Err(err) = self.srv_tx.command(from, command) {
                    log::warn!("Dropping command from {}: {}", from, err);
                }
            }
            ConnectionState::Idle => self.pending.push(command),
        }
    }

    fn handle_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let command = match ClientCommand::from_json(text) {
            Ok(command) => command,
            Err(err) => {
                log::warn!("Closing connection: {}", err);
                ctx.close(Some(CloseReason {
                    code: CloseCode::Invalid,
                    description: Some(err.to_string()),
                }));
                ctx.stop();
                return;
            }
        };
        if let Err(err) = command.validate() {
            log::warn!("Dropping command: {}", err);
            return;
        }
        log::debug!("Ingress {:?}", command);
        self.forward(command);
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<ConnectionEvent>(CONNECTION_BUFFER);

        if let Err(err) = self
            .srv_tx
            .connect(tx, self.initial_session_id.take())
        {
            log::error!("Refusing connection: {}", err);
            ctx.stop();
            return;
        }

        let addr = ctx.address().recipient();

        tokio::spawn(async move {
            log::debug!("connection green thread - started");
            while let Some(msg) = rx.recv().await {
                if addr.do_send(ConnectionActorMessage(msg)).is_err() {
                    break;
                }
            }
            log::debug!("connection green thread - terminated");
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        if let ConnectionState::Connected(id) = self.state {
            let _ = self.srv_tx.disconnect(id);
        }

        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Text(text)) => self.handle_text(&text, ctx),
            Ok(ws::Message::Binary(bin)) => match std::str::from_utf8(&bin) {
                Ok(text) => self.handle_text(text, ctx),
                Err(_) => {
                    ctx.close(Some(CloseReason {
                        code: CloseCode::Unsupported,
                        description: None,
                    }));
                    ctx.stop();
                }
            },
            Ok(ws::Message::Close(_)) => ctx.stop(),
            Err(err) => {
                log::warn!("Websocket protocol error: {}", err);
                ctx.stop();
            }
            _ => (),
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(
        &mut self,
        msg: ConnectionActorMessage,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Self::Result {
        match msg.0 {
            ConnectionEvent::Connected { connection_id } => {
                self.state = ConnectionState::Connected(connection_id);
                for command in std::mem::take(&mut self.pending) {
                    self.forward(command);
                }
            }
            ConnectionEvent::ServerEvent(event) => match event.to_json() {
                Ok(serialized) => {
                    log::debug!("Egress {}", serialized);
                    ctx.text(serialized);
                }
                Err(err) => log::warn!("Cannot encode {:?}: {}", event, err),
            },
        }
    }
}

#[derive(Deserialize)]
pub struct ConnectQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<SessionId>,
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<ConnectQuery>,
    srv_tx: web::Data<ServerTx>,
) -> Result<HttpResponse, Error> {
    ws::start(
        ConnectionActor {
            srv_tx: srv_tx.get_ref().clone(),
            state: ConnectionState::Idle,
            initial_session_id: query.into_inner().session_id.filter(|s| !s.is_empty()),
            pending: Vec::new(),
        },
        &req,
        stream,
    )
}

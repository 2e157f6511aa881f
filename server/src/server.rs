use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{channel, unbounded_channel, Receiver, Sender, UnboundedReceiver, UnboundedSender};

use system::{ClientCommand, ConnectionId, ServerEvent, SessionId};

use super::connection::{ConnectionCommand, ConnectionEvent};
use crate::connection_tx_storage::{ConnectionTx, ConnectionTxStorage};
use crate::server_state::ServerState;

const INGRESS_BUFFER: usize = 1024;

#[derive(Debug, Error, PartialEq)]
pub enum RelayError {
    #[error("relay has stopped")]
    Gone,
    #[error("relay is busy, command dropped")]
    Busy,
}

/// Handle used by connections to reach the relay.
///
/// Connect/Disconnect travel on their own unbounded channel (at most two per
/// connection) so they are never dropped. Session commands share a bounded
/// queue and are dropped when it is full.
#[derive(Debug, Clone)]
pub struct ServerTx {
    control: UnboundedSender<ConnectionCommand>,
    commands: Sender<ConnectionCommand>,
}

struct ServerRx {
    control: UnboundedReceiver<ConnectionCommand>,
    commands: Receiver<ConnectionCommand>,
}

fn server_channel(capacity: usize) -> (ServerTx, ServerRx) {
    let (control_tx, control_rx) = unbounded_channel();
    let (command_tx, command_rx) = channel(capacity);
    (
        ServerTx {
            control: control_tx,
            commands: command_tx,
        },
        ServerRx {
            control: control_rx,
            commands: command_rx,
        },
    )
}

impl ServerTx {
    pub fn connect(
        &self,
        tx: ConnectionTx,
        session_id: Option<SessionId>,
    ) -> Result<(), RelayError> {
        self.control
            .send(ConnectionCommand::Connect { tx, session_id })
            .map_err(|_| RelayError::Gone)
    }

    pub fn disconnect(&self, from: ConnectionId) -> Result<(), RelayError> {
        self.control
            .send(ConnectionCommand::Disconnect { from })
            .map_err(|_| RelayError::Gone)
    }

    pub fn command(&mut self, from: ConnectionId, command: ClientCommand) -> Result<(), RelayError> {
        self.commands
            .try_send(ConnectionCommand::Command { from, command })
            .map_err(|err| match err {
                TrySendError::Full(_) => RelayError::Busy,
                TrySendError::Closed(_) => RelayError::Gone,
            })
    }
}

/// Owns every piece of shared relay state. Commands from all connections are
/// processed one at a time by the task started in `spawn_server`.
struct Server {
    server_state: ServerState,
    connections: ConnectionTxStorage,
    /// Connections whose channel was found closed while sending.
    closed: Vec<ConnectionId>,
}

impl Server {
    fn new() -> Self {
        Self {
            server_state: ServerState::new(),
            connections: ConnectionTxStorage::new(),
            closed: Vec::new(),
        }
    }

    fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect { tx, session_id } => {
                let connection_id = self.server_state.create_connection();
                self.connections.insert(connection_id, tx);
                self.send(connection_id, ConnectionEvent::Connected { connection_id });
                if let Some(session_id) = session_id {
                    self.join_session(connection_id, session_id);
                }
            }
            ConnectionCommand::Disconnect { from } => self.disconnect(from),
            ConnectionCommand::Command { from, command } => {
                if self.server_state.connection_states.contains_key(&from) {
                    self.handle_client_command(from, command)
                } else {
                    log::debug!("Ignoring command from retired connection {}", from);
                }
            }
        }

        while let Some(connection_id) = self.closed.pop() {
            self.disconnect(connection_id);
        }
    }

    fn handle_client_command(&mut self, from: ConnectionId, command: ClientCommand) {
        log::debug!("Command from {}: {:?}", from, command);
        match command {
            ClientCommand::JoinSession { session_id } => self.join_session(from, session_id),
            ClientCommand::LeaveSession => {
                if let Some(session_id) = self.server_state.leave_session(&from) {
                    self.broadcast_session_event(
                        &session_id,
                        ServerEvent::UserLeft {
                            connection_id: from,
                        },
                        Some(from),
                    );
                } else {
                    log::warn!("Connection {} is not in any session", from);
                }
            }
            ClientCommand::DrawingAction { session_id, stroke } => {
                if !self.server_state.registry.draw(&session_id, stroke.clone()) {
                    log::debug!("Stroke {} already in session {}", stroke.id, session_id);
                }
                self.broadcast_session_event(
                    &session_id,
                    ServerEvent::DrawingAction {
                        connection_id: from,
                        stroke,
                    },
                    Some(from),
                );
            }
            ClientCommand::RemoveStroke {
                session_id,
                stroke_id,
            } => {
                self.server_state.registry.remove(&session_id, &stroke_id);
                self.broadcast_session_event(
                    &session_id,
                    ServerEvent::RemoveStroke {
                        connection_id: from,
                        stroke_id,
                    },
                    Some(from),
                );
            }
            ClientCommand::ClearSession { session_id } => {
                self.server_state.registry.clear(&session_id);
                log::info!("Session {} cleared by {}", session_id, from);
                self.broadcast_session_event(&session_id, ServerEvent::ClearSession, None);
            }
            ClientCommand::CursorMove {
                session_id,
                payload,
            } => self.broadcast_session_event(
                &session_id,
                ServerEvent::CursorMove {
                    connection_id: from,
                    payload,
                },
                Some(from),
            ),
        }
    }

    fn join_session(&mut self, from: ConnectionId, session_id: SessionId) {
        if let Some(previous) = self.server_state.join_session(&from, &session_id) {
            self.broadcast_session_event(
                &previous,
                ServerEvent::UserLeft {
                    connection_id: from,
                },
                Some(from),
            );
        }
        let snapshot = self.server_state.registry.snapshot(&session_id);
        self.send(
            from,
            ConnectionEvent::ServerEvent(ServerEvent::SessionData(snapshot)),
        );
        self.broadcast_session_event(
            &session_id,
            ServerEvent::UserJoined {
                connection_id: from,
            },
            Some(from),
        );
    }

    fn disconnect(&mut self, from: ConnectionId) {
        if self.connections.remove(&from).is_none()
            && !self.server_state.connection_states.contains_key(&from)
        {
            return;
        }
        if let Some(session_id) = self.server_state.disconnect(&from) {
            self.broadcast_session_event(
                &session_id,
                ServerEvent::UserLeft {
                    connection_id: from,
                },
                Some(from),
            );
        }
    }

    fn send(&mut self, to: ConnectionId, event: ConnectionEvent) {
        if !self.connections.send(&to, event) {
            self.closed.push(to);
        }
    }

    fn broadcast_session_event(
        &mut self,
        session_id: &str,
        session_event: ServerEvent,
        without: Option<ConnectionId>,
    ) {
        for connection_id in self.server_state.connection_ids_in_session(session_id) {
            if without != Some(*connection_id)
                && !self.connections.send(
                    connection_id,
                    ConnectionEvent::ServerEvent(session_event.clone()),
                )
            {
                self.closed.push(*connection_id);
            }
        }
    }
}

pub fn spawn_server() -> ServerTx {
    let (srv_tx, mut srv_rx) = server_channel(INGRESS_BUFFER);

    tokio::spawn(async move {
        let mut server = Server::new();

        loop {
            let command = tokio::select! {
                Some(command) = srv_rx.control.recv() => command,
                Some(command) = srv_rx.commands.recv() => command,
                else => break,
            };
            server.handle_connection_command(command);
        }
        log::info!("Relay stopped");
    });

    srv_tx
}

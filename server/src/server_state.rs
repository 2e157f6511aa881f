use crate::session::Session;
use std::collections::HashMap;
use std::num::Wrapping;
use system::{ConnectionId, SessionId, SessionRegistry};

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    Idle,
    Joined(SessionId),
}

pub struct ServerState {
    pub connection_id_source: Wrapping<ConnectionId>,
    pub connection_states: HashMap<ConnectionId, ConnectionState>,
    pub sessions: HashMap<SessionId, Session>,
    pub registry: SessionRegistry,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            connection_id_source: Wrapping(0),
            connection_states: HashMap::new(),
            sessions: HashMap::new(),
            registry: SessionRegistry::new(),
        }
    }

    pub fn create_connection(&mut self) -> ConnectionId {
        let connection_id = self.new_connection_id();
        self.connection_states
            .insert(connection_id, ConnectionState::Idle);
        log::info!("Connection {} created", connection_id);
        connection_id
    }

    pub fn current_session(&self, connection_id: &ConnectionId) -> Option<&SessionId> {
        match self.connection_states.get(connection_id) {
            Some(ConnectionState::Joined(session_id)) => Some(session_id),
            _ => None,
        }
    }

    /// A connection belongs to at most one session. Joining another one leaves
    /// the current session first, which is returned so departure can be announced.
    pub fn join_session(
        &mut self,
        connection_id: &ConnectionId,
        session_id: &SessionId,
    ) -> Option<SessionId> {
        let previous = if self.current_session(connection_id) == Some(session_id) {
            None
        } else {
            self.leave_session(connection_id)
        };
        self.sessions
            .entry(session_id.clone())
            .or_insert_with(Session::new)
            .add(*connection_id);
        self.connection_states
            .insert(*connection_id, ConnectionState::Joined(session_id.clone()));
        log::info!("Connection {} joined session {}", connection_id, session_id);
        previous
    }

    pub fn leave_session(&mut self, connection_id: &ConnectionId) -> Option<SessionId> {
        let session_id = match self.connection_states.get(connection_id) {
            Some(ConnectionState::Joined(session_id)) => session_id.clone(),
            _ => return None,
        };
        self.connection_states
            .insert(*connection_id, ConnectionState::Idle);
        let is_empty = self
            .sessions
            .get_mut(&session_id)
            .map(|s| {
                s.remove(connection_id);
                s.connections.is_empty()
            })
            .unwrap_or(false);
        if is_empty {
            // Membership only; the session's strokes stay in the registry.
            self.sessions.remove(&session_id);
        }
        log::info!("Connection {} left session {}", connection_id, session_id);
        Some(session_id)
    }

    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> Option<SessionId> {
        let left = self.leave_session(connection_id);
        self.connection_states.remove(connection_id);
        log::info!("Connection {} disconnected", connection_id);
        left
    }

    pub fn connection_ids_in_session(&self, session_id: &str) -> &[ConnectionId] {
        self.sessions
            .get(session_id)
            .map(|s| s.connections.as_slice())
            .unwrap_or(&[])
    }

    fn new_connection_id(&mut self) -> ConnectionId {
        loop {
            self.connection_id_source += Wrapping(1);
            let candidate = self.connection_id_source.0;
            if !self.connection_states.contains_key(&candidate) {
                break candidate;
            }
        }
    }
}

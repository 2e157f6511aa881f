use crate::stroke::{Stroke, StrokeError};
use crate::types::{ConnectionId, SessionId, StrokeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Every frame is `{"event": <name>, "data": <payload>}`. Event names follow the
// kebab-case vocabulary shared with existing browser clients.

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid stroke: {0}")]
    InvalidStroke(#[from] StrokeError),
}

/// Ephemeral pointer position. Never stored by the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPayload {
    pub x: f64,
    pub y: f64,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Client -> relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientCommand {
    #[serde(rename_all = "camelCase")]
    JoinSession { session_id: SessionId },
    LeaveSession,
    #[serde(rename_all = "camelCase")]
    DrawingAction {
        session_id: SessionId,
        stroke: Stroke,
    },
    #[serde(rename_all = "camelCase")]
    RemoveStroke {
        session_id: SessionId,
        stroke_id: StrokeId,
    },
    #[serde(rename_all = "camelCase")]
    ClearSession { session_id: SessionId },
    #[serde(rename_all = "camelCase")]
    CursorMove {
        session_id: SessionId,
        payload: CursorPayload,
    },
}

impl ClientCommand {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// The session this command addresses, if any.
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::JoinSession { session_id }
            | Self::DrawingAction { session_id, .. }
            | Self::RemoveStroke { session_id, .. }
            | Self::ClearSession { session_id }
            | Self::CursorMove { session_id, .. } => Some(session_id),
            Self::LeaveSession => None,
        }
    }

    /// Boundary check run by the relay before a command may touch shared state.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Self::DrawingAction { stroke, .. } => Ok(stroke.validate()?),
            _ => Ok(()),
        }
    }
}

/// Relay -> client. `connection_id` is the relay-assigned id of the originating
/// connection and goes over the wire as `socketId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    SessionData(Vec<Stroke>),
    UserJoined {
        #[serde(rename = "socketId")]
        connection_id: ConnectionId,
    },
    UserLeft {
        #[serde(rename = "socketId")]
        connection_id: ConnectionId,
    },
    DrawingAction {
        #[serde(rename = "socketId")]
        connection_id: ConnectionId,
        stroke: Stroke,
    },
    RemoveStroke {
        #[serde(rename = "socketId")]
        connection_id: ConnectionId,
        #[serde(rename = "strokeId")]
        stroke_id: StrokeId,
    },
    ClearSession,
    CursorMove {
        #[serde(rename = "socketId")]
        connection_id: ConnectionId,
        payload: CursorPayload,
    },
}

impl ServerEvent {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

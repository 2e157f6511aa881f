use crate::message::{ClientCommand, CursorPayload, ServerEvent};
use crate::stroke::{Brush, Stroke};
use crate::stroke_store::StrokeStore;
use crate::types::{ConnectionId, SessionId};
use std::collections::HashMap;

/// Drives one client's view of a session.
///
/// Gestures mutate local state first and hand back the `ClientCommand` the host
/// should send. Nothing here waits for the relay: sends are fire-and-forget and
/// local state is never rolled back.
pub struct ClientSession {
    session_id: SessionId,
    author_id: Option<String>,
    brush: Brush,
    store: StrokeStore,
    in_progress: Option<Stroke>,
    peers: HashMap<ConnectionId, Option<CursorPayload>>,
}

impl ClientSession {
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
            author_id: None,
            brush: Brush::default(),
            store: StrokeStore::new(),
            in_progress: None,
            peers: HashMap::new(),
        }
    }

    pub fn with_author(mut self, author_id: impl Into<String>) -> Self {
        self.author_id = Some(author_id.into());
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn join(&self) -> ClientCommand {
        ClientCommand::JoinSession {
            session_id: self.session_id.clone(),
        }
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    /// Applies to strokes begun afterwards.
    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    pub fn begin_stroke(&mut self, x: f64, y: f64) {
        let mut stroke = Stroke::begin(x, y, &self.brush);
        stroke.author_id = self.author_id.clone();
        if self.in_progress.replace(stroke).is_some() {
            log::debug!("Discarding unfinished stroke");
        }
    }

    pub fn extend_stroke(&mut self, x: f64, y: f64) {
        if let Some(stroke) = self.in_progress.as_mut() {
            stroke.push_point(x, y);
        }
    }

    pub fn finish_stroke(&mut self) -> Option<ClientCommand> {
        let stroke = self.in_progress.take()?;
        self.store.commit_local(stroke.clone());
        Some(ClientCommand::DrawingAction {
            session_id: self.session_id.clone(),
            stroke,
        })
    }

    pub fn in_progress(&self) -> Option<&Stroke> {
        self.in_progress.as_ref()
    }

    pub fn undo(&mut self) -> Option<ClientCommand> {
        let stroke_id = self.store.undo()?;
        Some(ClientCommand::RemoveStroke {
            session_id: self.session_id.clone(),
            stroke_id,
        })
    }

    pub fn redo(&mut self) -> Option<ClientCommand> {
        let stroke = self.store.redo()?;
        Some(ClientCommand::DrawingAction {
            session_id: self.session_id.clone(),
            stroke,
        })
    }

    /// Local strokes are dropped once the relay echoes the clear back.
    pub fn clear(&self) -> ClientCommand {
        ClientCommand::ClearSession {
            session_id: self.session_id.clone(),
        }
    }

    pub fn move_cursor(
        &self,
        x: f64,
        y: f64,
        user_id: impl Into<String>,
        name: Option<String>,
        color: Option<String>,
    ) -> ClientCommand {
        ClientCommand::CursorMove {
            session_id: self.session_id.clone(),
            payload: CursorPayload {
                x,
                y,
                user_id: user_id.into(),
                name,
                color,
            },
        }
    }

    pub fn handle_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::SessionData(strokes) => {
                log::debug!("Snapshot with {} strokes", strokes.len());
                self.store.load_snapshot(strokes);
            }
            ServerEvent::DrawingAction { stroke, .. } => {
                self.store.apply_remote(stroke);
            }
            ServerEvent::RemoveStroke { stroke_id, .. } => self.store.remove(&stroke_id),
            ServerEvent::ClearSession => self.store.reset(),
            ServerEvent::UserJoined { connection_id } => {
                self.peers.entry(connection_id).or_insert(None);
            }
            ServerEvent::UserLeft { connection_id } => {
                self.peers.remove(&connection_id);
            }
            ServerEvent::CursorMove {
                connection_id,
                payload,
            } => {
                self.peers.insert(connection_id, Some(payload));
            }
        }
    }

    pub fn store(&self) -> &StrokeStore {
        &self.store
    }

    pub fn strokes(&self) -> &[Stroke] {
        self.store.strokes()
    }

    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    pub fn peers(&self) -> impl Iterator<Item = &ConnectionId> {
        self.peers.keys()
    }

    pub fn cursors(&self) -> impl Iterator<Item = (&ConnectionId, &CursorPayload)> {
        self.peers
            .iter()
            .filter_map(|(id, cursor)| cursor.as_ref().map(|c| (id, c)))
    }
}

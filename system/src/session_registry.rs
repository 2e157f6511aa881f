use crate::stroke::Stroke;
use crate::types::SessionId;
use std::collections::HashMap;

// Authoritative stroke lists, one per session. Sessions are created on first
// reference and live until the process exits; clear empties but keeps them.

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Vec<Stroke>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn strokes_mut(&mut self, session_id: &str) -> &mut Vec<Stroke> {
        if !self.sessions.contains_key(session_id) {
            log::info!("Session {} created", session_id);
        }
        self.sessions.entry(session_id.to_owned()).or_default()
    }

    /// Current stroke sequence of a session, in arrival order.
    pub fn snapshot(&mut self, session_id: &str) -> Vec<Stroke> {
        self.strokes_mut(session_id).clone()
    }

    pub fn strokes(&self, session_id: &str) -> &[Stroke] {
        self.sessions
            .get(session_id)
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }

    /// Appends `stroke` unless one with the same id is already present.
    pub fn draw(&mut self, session_id: &str, stroke: Stroke) -> bool {
        let strokes = self.strokes_mut(session_id);
        if strokes.iter().any(|s| s.id == stroke.id) {
            false
        } else {
            strokes.push(stroke);
            true
        }
    }

    /// Unknown sessions are left alone; only join and draw create one.
    pub fn remove(&mut self, session_id: &str, stroke_id: &str) -> bool {
        match self.sessions.get_mut(session_id) {
            Some(strokes) => {
                let before = strokes.len();
                strokes.retain(|s| s.id != stroke_id);
                strokes.len() != before
            }
            None => false,
        }
    }

    pub fn clear(&mut self, session_id: &str) {
        if let Some(strokes) = self.sessions.get_mut(session_id) {
            strokes.clear();
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

use crate::stroke::Stroke;
use crate::types::StrokeId;

/// Client-local view of a session: the visible strokes plus the linear
/// undo/redo history that decides which remove/draw events get re-broadcast.
///
/// The undo stack holds every stroke this client committed or observed,
/// so undo also retracts strokes drawn by peers.
#[derive(Debug, Default)]
pub struct StrokeStore {
    strokes: Vec<Stroke>,
    undo_stack: Vec<Stroke>,
    redo_stack: Vec<Stroke>,
}

impl StrokeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caller must supply a fresh id.
    pub fn commit_local(&mut self, stroke: Stroke) {
        self.strokes.push(stroke.clone());
        self.undo_stack.push(stroke);
        self.redo_stack.clear();
    }

    /// Idempotent merge of a stroke that arrived from the relay.
    /// Returns false when a stroke with the same id is already visible.
    pub fn apply_remote(&mut self, stroke: Stroke) -> bool {
        if self.contains(&stroke.id) {
            return false;
        }
        if !self.undo_stack.iter().any(|s| s.id == stroke.id) {
            self.undo_stack.push(stroke.clone());
        }
        self.strokes.push(stroke);
        true
    }

    pub fn remove(&mut self, stroke_id: &str) {
        self.strokes.retain(|s| s.id != stroke_id);
        self.undo_stack.retain(|s| s.id != stroke_id);
        self.redo_stack.retain(|s| s.id != stroke_id);
    }

    /// Retracts the most recent stroke and returns its id for a remove event.
    pub fn undo(&mut self) -> Option<StrokeId> {
        let stroke = self.undo_stack.pop()?;
        self.strokes.retain(|s| s.id != stroke.id);
        let stroke_id = stroke.id.clone();
        self.redo_stack.push(stroke);
        Some(stroke_id)
    }

    /// Re-applies the most recently undone stroke on top of the collection and
    /// returns it for a draw event.
    pub fn redo(&mut self) -> Option<Stroke> {
        let stroke = self.redo_stack.pop()?;
        // A peer may have re-drawn the same id in the meantime.
        self.strokes.retain(|s| s.id != stroke.id);
        self.undo_stack.retain(|s| s.id != stroke.id);
        self.strokes.push(stroke.clone());
        self.undo_stack.push(stroke.clone());
        Some(stroke)
    }

    pub fn reset(&mut self) {
        self.strokes.clear();
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Replaces local state with a relay snapshot.
    pub fn load_snapshot(&mut self, strokes: Vec<Stroke>) {
        self.reset();
        for stroke in strokes {
            self.apply_remote(stroke);
        }
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn contains(&self, stroke_id: &str) -> bool {
        self.strokes.iter().any(|s| s.id == stroke_id)
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(id: &str) -> Stroke {
        Stroke {
            id: id.into(),
            points: vec![0.0, 0.0, 10.0, 10.0],
            color: "#000".into(),
            size: 4.0,
            erasing: false,
            author_id: None,
        }
    }

    fn ids(store: &StrokeStore) -> Vec<&str> {
        store.strokes().iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn it_ignores_duplicate_remote_strokes() {
        let mut store = StrokeStore::new();
        store.commit_local(stroke("s1"));

        assert!(!store.apply_remote(stroke("s1")));
        assert!(store.apply_remote(stroke("s2")));
        assert!(!store.apply_remote(stroke("s2")));
        assert_eq!(ids(&store), vec!["s1", "s2"]);
    }

    #[test]
    fn undo_then_redo_restores_content_on_top() {
        let mut store = StrokeStore::new();
        store.commit_local(stroke("s1"));
        store.commit_local(stroke("s2"));
        store.apply_remote(stroke("s3"));
        store.commit_local(stroke("s4"));

        // s4 is the most recent entry in the undo stack
        assert_eq!(store.undo().as_deref(), Some("s4"));
        assert_eq!(ids(&store), vec!["s1", "s2", "s3"]);

        let redone = store.redo().expect("redo must be available");
        assert_eq!(redone, stroke("s4"));
        assert_eq!(ids(&store), vec!["s1", "s2", "s3", "s4"]);
        assert!(!store.can_redo());
    }

    #[test]
    fn redo_reinserts_at_the_end() {
        let mut store = StrokeStore::new();
        store.commit_local(stroke("s1"));
        store.commit_local(stroke("s2"));

        store.undo();
        store.undo();
        store.apply_remote(stroke("r1"));
        store.redo();

        assert_eq!(ids(&store), vec!["r1", "s1"]);
    }

    #[test]
    fn new_local_commit_invalidates_redo() {
        let mut store = StrokeStore::new();
        store.commit_local(stroke("s1"));
        store.undo();
        assert!(store.can_redo());

        store.commit_local(stroke("s2"));
        assert!(!store.can_redo());
        assert_eq!(store.redo(), None);
        assert_eq!(ids(&store), vec!["s2"]);
    }

    #[test]
    fn remote_strokes_do_not_invalidate_redo() {
        let mut store = StrokeStore::new();
        store.commit_local(stroke("s1"));
        store.undo();
        store.apply_remote(stroke("r1"));

        assert!(store.can_redo());
    }

    #[test]
    fn undo_and_redo_on_empty_history_are_noops() {
        let mut store = StrokeStore::new();
        assert_eq!(store.undo(), None);
        assert_eq!(store.redo(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn remove_clears_every_collection() {
        let mut store = StrokeStore::new();
        store.commit_local(stroke("s1"));
        store.commit_local(stroke("s2"));
        store.undo();

        store.remove("s2");
        store.remove("s1");
        store.remove("missing");

        assert!(store.is_empty());
        assert!(!store.can_undo());
        assert!(!store.can_redo());
    }

    #[test]
    fn redo_does_not_duplicate_a_stroke_redrawn_by_a_peer() {
        let mut store = StrokeStore::new();
        store.apply_remote(stroke("s1"));
        store.undo();
        store.apply_remote(stroke("s1"));

        store.redo();
        assert_eq!(ids(&store), vec!["s1"]);
    }

    #[test]
    fn load_snapshot_replaces_state() {
        let mut store = StrokeStore::new();
        store.commit_local(stroke("old"));
        store.undo();

        store.load_snapshot(vec![stroke("a"), stroke("b"), stroke("a")]);

        assert_eq!(ids(&store), vec!["a", "b"]);
        assert!(!store.can_redo());
        assert_eq!(store.undo().as_deref(), Some("b"));
    }
}

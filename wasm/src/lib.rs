mod utils;

use system::{serde_json, Brush, ClientCommand, ClientSession, ServerEvent, Tool};
use wasm_bindgen::prelude::*;

/// Browser-facing handle on a `ClientSession`.
///
/// Commands come back as JSON frames ready to be written to the socket, and
/// relay frames are fed in as received. Rendering stays on the JS side.
#[wasm_bindgen]
pub struct WhiteboardClient {
    session: ClientSession,
}

fn encode(command: ClientCommand) -> String {
    command.to_json().expect("must succeed")
}

#[wasm_bindgen]
impl WhiteboardClient {
    #[wasm_bindgen(constructor)]
    pub fn new(session_id: String, author_id: Option<String>) -> Self {
        utils::set_panic_hook();

        let session = ClientSession::new(session_id);
        let session = match author_id {
            Some(author_id) => session.with_author(author_id),
            None => session,
        };
        WhiteboardClient { session }
    }

    pub fn join(&self) -> String {
        encode(self.session.join())
    }

    pub fn set_brush(&mut self, color: String, size: f64, eraser: bool) {
        self.session.set_brush(Brush {
            color,
            size,
            tool: if eraser { Tool::Eraser } else { Tool::Pen },
        });
    }

    pub fn begin_stroke(&mut self, x: f64, y: f64) {
        self.session.begin_stroke(x, y);
    }

    pub fn extend_stroke(&mut self, x: f64, y: f64) {
        self.session.extend_stroke(x, y);
    }

    pub fn finish_stroke(&mut self) -> Option<String> {
        self.session.finish_stroke().map(encode)
    }

    pub fn undo(&mut self) -> Option<String> {
        self.session.undo().map(encode)
    }

    pub fn redo(&mut self) -> Option<String> {
        self.session.redo().map(encode)
    }

    pub fn clear(&self) -> String {
        encode(self.session.clear())
    }

    pub fn move_cursor(
        &self,
        x: f64,
        y: f64,
        user_id: String,
        name: Option<String>,
        color: Option<String>,
    ) -> String {
        encode(self.session.move_cursor(x, y, user_id, name, color))
    }

    /// Returns false for frames that are not relay events.
    pub fn handle_event(&mut self, json: String) -> bool {
        match ServerEvent::from_json(&json) {
            Ok(event) => {
                self.session.handle_event(event);
                true
            }
            Err(err) => {
                log::warn!("Ignoring relay frame: {}", err);
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.session.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.session.can_redo()
    }

    pub fn materialize_strokes(&self) -> String {
        serde_json::to_string(self.session.strokes()).expect("must succeed")
    }

    pub fn materialize_in_progress(&self) -> Option<String> {
        self.session
            .in_progress()
            .map(|stroke| serde_json::to_string(stroke).expect("must succeed"))
    }

    pub fn materialize_cursors(&self) -> String {
        let cursors = self
            .session
            .cursors()
            .map(|(connection_id, payload)| {
                serde_json::json!({ "socketId": connection_id, "payload": payload })
            })
            .collect::<Vec<_>>();
        serde_json::to_string(&cursors).expect("must succeed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_round_trips_a_stroke_through_json_frames() {
        let mut client = WhiteboardClient::new("abc123".into(), Some("alice".into()));
        assert_eq!(
            client.join(),
            r#"{"event":"join-session","data":{"sessionId":"abc123"}}"#
        );

        client.set_brush("#ff0000".into(), 6.0, false);
        client.begin_stroke(0.0, 0.0);
        client.extend_stroke(10.0, 10.0);
        assert!(client.materialize_in_progress().is_some());

        let frame = client.finish_stroke().expect("stroke in progress");
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["event"], "drawing-action");
        assert_eq!(value["data"]["stroke"]["authorId"], "alice");

        let strokes: serde_json::Value =
            serde_json::from_str(&client.materialize_strokes()).unwrap();
        assert_eq!(strokes.as_array().map(|a| a.len()), Some(1));
        assert!(client.can_undo());
    }

    #[test]
    fn it_applies_relay_frames() {
        let mut client = WhiteboardClient::new("abc123".into(), None);
        assert!(client.handle_event(
            r##"{"event":"drawing-action","data":{"socketId":1,"stroke":{"id":"s1","points":[0,0,10,10],"color":"#000","size":4,"erasing":false}}}"##.into()
        ));
        assert!(client.handle_event(
            r#"{"event":"cursor-move","data":{"socketId":1,"payload":{"x":3,"y":4,"userId":"u1"}}}"#.into()
        ));
        assert!(!client.handle_event("{}".into()));

        let undo = client.undo().expect("remote stroke is undoable");
        assert_eq!(
            undo,
            r#"{"event":"remove-stroke","data":{"sessionId":"abc123","strokeId":"s1"}}"#
        );

        let cursors: serde_json::Value =
            serde_json::from_str(&client.materialize_cursors()).unwrap();
        assert_eq!(cursors[0]["socketId"], 1);
        assert_eq!(cursors[0]["payload"]["userId"], "u1");
    }
}

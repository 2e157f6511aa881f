use crate::types::StrokeId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single freehand mark. `points` holds flattened (x, y) pairs.
///
/// Eraser marks are strokes too: they are stored and replicated like any
/// other stroke and only differ in how the renderer composites them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub id: StrokeId,
    pub points: Vec<f64>,
    pub color: String,
    pub size: f64,
    pub erasing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum StrokeError {
    #[error("stroke id is empty")]
    EmptyId,
    #[error("stroke size must be a positive number, got {0}")]
    InvalidSize(f64),
    #[error("stroke has an odd number of coordinates ({0})")]
    UnpairedCoordinate(usize),
    #[error("stroke coordinate at {0} is not a finite number")]
    NonFiniteCoordinate(usize),
}

impl Stroke {
    /// Starts a stroke at `(x, y)` with a freshly generated id.
    pub fn begin(x: f64, y: f64, brush: &Brush) -> Self {
        Self {
            id: generate_stroke_id(),
            points: vec![x, y],
            color: brush.color.clone(),
            size: brush.size,
            erasing: brush.tool == Tool::Eraser,
            author_id: None,
        }
    }

    pub fn push_point(&mut self, x: f64, y: f64) {
        self.points.push(x);
        self.points.push(y);
    }

    pub fn point_pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }

    pub fn validate(&self) -> Result<(), StrokeError> {
        if self.id.is_empty() {
            return Err(StrokeError::EmptyId);
        }
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(StrokeError::InvalidSize(self.size));
        }
        if self.points.len() % 2 != 0 {
            return Err(StrokeError::UnpairedCoordinate(self.points.len()));
        }
        if let Some(index) = self.points.iter().position(|v| !v.is_finite()) {
            return Err(StrokeError::NonFiniteCoordinate(index));
        }
        Ok(())
    }
}

pub fn generate_stroke_id() -> StrokeId {
    uuid::Uuid::new_v4().to_simple().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tool {
    Pen,
    Eraser,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    pub color: String,
    pub size: f64,
    pub tool: Tool,
}

impl std::default::Default for Brush {
    fn default() -> Self {
        Self {
            color: "#000000".into(),
            size: 4.0,
            tool: Tool::Pen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(points: Vec<f64>) -> Stroke {
        Stroke {
            id: "s1".into(),
            points,
            color: "#000".into(),
            size: 4.0,
            erasing: false,
            author_id: None,
        }
    }

    #[test]
    fn it_serializes_with_camel_case_and_omits_missing_author() {
        let json = serde_json::to_value(&stroke(vec![0.0, 0.0, 10.0, 10.0])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "s1",
                "points": [0.0, 0.0, 10.0, 10.0],
                "color": "#000",
                "size": 4.0,
                "erasing": false
            })
        );

        let mut authored = stroke(vec![]);
        authored.author_id = Some("alice".into());
        let json = serde_json::to_value(&authored).unwrap();
        assert_eq!(json["authorId"], "alice");
    }

    #[test]
    fn it_accepts_stroke_without_author_field() {
        let parsed: Stroke = serde_json::from_str(
            r##"{"id":"s1","points":[1,2],"color":"#fff","size":2,"erasing":true}"##,
        )
        .unwrap();
        assert_eq!(parsed.author_id, None);
        assert!(parsed.erasing);
        assert_eq!(parsed.point_pairs().collect::<Vec<_>>(), vec![(1.0, 2.0)]);
    }

    #[test]
    fn it_rejects_malformed_strokes() {
        assert!(stroke(vec![0.0, 0.0, 10.0, 10.0]).validate().is_ok());
        assert_eq!(
            stroke(vec![0.0, 0.0, 10.0]).validate(),
            Err(StrokeError::UnpairedCoordinate(3))
        );
        assert_eq!(
            stroke(vec![0.0, f64::NAN]).validate(),
            Err(StrokeError::NonFiniteCoordinate(1))
        );

        let mut s = stroke(vec![]);
        s.size = 0.0;
        assert_eq!(s.validate(), Err(StrokeError::InvalidSize(0.0)));

        let mut s = stroke(vec![]);
        s.id.clear();
        assert_eq!(s.validate(), Err(StrokeError::EmptyId));
    }

    #[test]
    fn it_begins_stroke_from_brush() {
        let brush = Brush {
            color: "#ff0000".into(),
            size: 8.0,
            tool: Tool::Eraser,
        };
        let mut s = Stroke::begin(1.0, 2.0, &brush);
        s.push_point(3.0, 4.0);

        assert!(!s.id.is_empty());
        assert!(s.erasing);
        assert_eq!(s.size, 8.0);
        assert_eq!(s.points, vec![1.0, 2.0, 3.0, 4.0]);
        assert_ne!(s.id, Stroke::begin(1.0, 2.0, &brush).id);
    }
}

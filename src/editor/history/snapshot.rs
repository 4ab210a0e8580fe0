//! Serializable copies of the editor state.
//!
//! The same types back the undo history and the native document format, so a
//! saved file can be restored exactly like an undo step.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::editor::polygons::{EditorMode, Polygon, PolygonId};

/// One polygon as stored in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonSnapshot {
    pub id: PolygonId,
    pub points: Vec<[f32; 3]>,
    /// Category color at the time of the snapshot (0xRRGGBB)
    pub color: u32,
    #[serde(default)]
    pub active: bool,
    /// Inferred from `active` and the point count when missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
    /// Resolved from `color` when missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl PolygonSnapshot {
    pub fn from_polygon(polygon: &Polygon, color: u32) -> Self {
        Self {
            id: polygon.id,
            points: polygon.points.iter().map(|p| p.to_array()).collect(),
            color,
            active: polygon.active,
            closed: Some(polygon.closed),
            category: Some(polygon.category.clone()),
        }
    }

    /// Points with non-finite coordinates dropped.
    pub fn finite_points(&self) -> Vec<Vec3> {
        self.points
            .iter()
            .map(|p| Vec3::from_array(*p))
            .filter(|p| p.is_finite())
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
            .unwrap_or(!self.active && self.points.len() >= 3)
    }
}

/// Full editor state: every polygon, the selection, and the mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    pub polygons: Vec<PolygonSnapshot>,
    #[serde(default)]
    pub selected_id: Option<PolygonId>,
    #[serde(default)]
    pub mode: EditorMode,
}

impl EditorSnapshot {
    pub fn polygon(&self, id: PolygonId) -> Option<&PolygonSnapshot> {
        self.polygons.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_json_shape() {
        let snapshot = EditorSnapshot {
            polygons: vec![PolygonSnapshot {
                id: 3,
                points: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.5]],
                color: 0xff0000,
                active: false,
                closed: Some(true),
                category: Some("undrivable".into()),
            }],
            selected_id: Some(3),
            mode: EditorMode::Edit,
        };

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["selectedId"], json!(3));
        assert_eq!(value["mode"], json!("EDIT"));
        assert_eq!(value["polygons"][0]["points"][2], json!([1.0, 1.0, 0.5]));
        assert_eq!(value["polygons"][0]["color"], json!(0xff0000));
    }

    #[test]
    fn test_minimal_snapshot_infers_fields() {
        let snapshot: EditorSnapshot = serde_json::from_value(json!({
            "polygons": [
                {"id": 1, "points": [[0, 0, 0], [1, 0, 0], [1, 1, 0]], "color": 16776960, "active": false},
                {"id": 2, "points": [[0, 0, 0], [1, 0, 0], [1, 1, 0]], "color": 16776960, "active": true}
            ],
            "selectedId": null,
            "mode": "SELECT"
        }))
        .unwrap();

        assert_eq!(snapshot.mode, EditorMode::Edit);
        assert!(snapshot.polygons[0].is_closed());
        assert!(!snapshot.polygons[1].is_closed());
        assert!(snapshot.polygons[0].category.is_none());
    }

    #[test]
    fn test_missing_selection_and_mode_default() {
        let snapshot: EditorSnapshot = serde_json::from_value(json!({"polygons": []})).unwrap();
        assert_eq!(snapshot.selected_id, None);
        assert_eq!(snapshot.mode, EditorMode::Idle);
    }
}

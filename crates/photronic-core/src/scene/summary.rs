//! Compact scene description for model prompts.

use photronic_types::models::BoundingBox;
use serde::Serialize;

use super::SceneModel;

/// One live element as the model sees it: id, type and bounds only.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ElementSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub bounds: BoundingBox,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct SceneSummary {
    pub elements: Vec<ElementSummary>,
}

impl SceneSummary {
    /// Summarize live elements in stacking order (bottom first).
    pub fn from_scene(scene: &SceneModel) -> Self {
        let mut live: Vec<_> = scene.live_elements().collect();
        live.sort_by_key(|e| e.z_index);

        let elements = live
            .into_iter()
            .map(|e| ElementSummary {
                id: e.id.clone(),
                kind: e.kind.label(),
                bounds: round_bounds(e.bounds()),
                locked: e.locked,
            })
            .collect();
        Self { elements }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// One JSON object per line, or a marker for an empty canvas.
    pub fn to_prompt_text(&self) -> String {
        if self.elements.is_empty() {
            return "(the canvas is empty)".to_string();
        }
        self.elements
            .iter()
            .filter_map(|e| serde_json::to_string(e).ok())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn round_bounds(b: BoundingBox) -> BoundingBox {
    let r = |v: f64| (v * 100.0).round() / 100.0;
    BoundingBox { x: r(b.x), y: r(b.y), width: r(b.width), height: r(b.height) }
}

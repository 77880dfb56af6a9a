//! Edit-intent parser.
//!
//! Model output is untrusted. Structured blocks (`<edit_plan> ... </edit_plan>`)
//! are parsed against a strict wire schema, converted to domain operations and
//! checked against the scene before anything can reach the applier.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use photronic_types::models::Style;
use photronic_types::{
    EditOperation, EditPlan, ElementDiff, ElementKind, Geometry, NewElement, PlanError, ShapeKind,
};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{clamp_opacity, clamp_stroke_width};
use crate::scene::SceneModel;

const DEFAULT_FONT_SIZE: f64 = 20.0;

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static FENCE_REGEX: OnceLock<Regex> = OnceLock::new();
static BLANK_LINES_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_tag_regex() -> &'static Regex {
    TAG_REGEX.get_or_init(|| Regex::new(r"(?i)<\s*(/?)\s*edit_plan\s*>").expect("Tag regex is valid"))
}

fn get_fence_regex() -> &'static Regex {
    FENCE_REGEX.get_or_init(|| {
        Regex::new(r"(?s)^```[a-zA-Z]*\s*(.*?)\s*```$").expect("Fence regex is valid")
    })
}

fn get_blank_lines_regex() -> &'static Regex {
    BLANK_LINES_REGEX.get_or_init(|| Regex::new(r"\n{3,}").expect("Blank lines regex is valid"))
}

// ===== Wire schema =====

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum WireOperation {
    #[serde(alias = "add_element")]
    Add { element: WireElement },
    #[serde(alias = "modify_element")]
    Modify {
        id: String,
        #[serde(alias = "diff")]
        changes: WireChanges,
    },
    #[serde(alias = "delete_element")]
    Delete { id: String },
    None,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct WireElement {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: Option<String>,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    #[serde(default)]
    rotation: Option<f64>,
    #[serde(default)]
    stroke_color: Option<String>,
    #[serde(default, alias = "backgroundColor")]
    fill_color: Option<String>,
    #[serde(default)]
    stroke_width: Option<f64>,
    #[serde(default)]
    opacity: Option<f64>,
    #[serde(default)]
    z_index: Option<i64>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    font_size: Option<f64>,
    #[serde(default)]
    file_id: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct WireChanges {
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
    #[serde(default)]
    rotation: Option<f64>,
    #[serde(default)]
    stroke_color: Option<String>,
    #[serde(default, alias = "backgroundColor")]
    fill_color: Option<String>,
    #[serde(default)]
    stroke_width: Option<f64>,
    #[serde(default)]
    opacity: Option<f64>,
    #[serde(default)]
    z_index: Option<i64>,
    #[serde(default)]
    text: Option<String>,
}

impl WireElement {
    fn into_domain(self) -> Result<NewElement, String> {
        let kind = match self.kind.trim().to_ascii_lowercase().as_str() {
            "text" => {
                let font_size = self.font_size.unwrap_or(DEFAULT_FONT_SIZE);
                if !(font_size.is_finite() && font_size > 0.0) {
                    return Err(format!("fontSize must be a positive number, got {}", font_size));
                }
                ElementKind::Text {
                    text: self.text.filter(|t| !t.is_empty()).ok_or("text element requires \"text\"")?,
                    font_size,
                }
            },
            "image" => ElementKind::Image {
                file_id: self.file_id.filter(|f| !f.is_empty()).ok_or("image element requires \"fileId\"")?,
                mime_type: self.mime_type,
            },
            "circle" => ElementKind::Shape { shape: ShapeKind::Ellipse },
            "square" => ElementKind::Shape { shape: ShapeKind::Rectangle },
            other => ElementKind::Shape {
                shape: ShapeKind::from_name(other)
                    .ok_or_else(|| format!("unknown element type \"{}\"", self.kind))?,
            },
        };

        let mut style = match kind {
            ElementKind::Image { .. } => Style::transparent(),
            ElementKind::Shape { .. } | ElementKind::Text { .. } => Style::default(),
        };
        if let Some(color) = self.stroke_color {
            style.stroke_color = color;
        }
        if let Some(color) = self.fill_color {
            style.fill_color = color;
        }
        if let Some(width) = self.stroke_width {
            style.stroke_width = clamp_stroke_width(width);
        }
        if let Some(opacity) = self.opacity {
            style.opacity = clamp_opacity(opacity);
        }

        let geometry = Geometry {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            rotation: self.rotation.unwrap_or(0.0),
        };
        let id = self.id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty());

        Ok(NewElement { id, kind, geometry, style, z_index: self.z_index })
    }
}

impl From<WireChanges> for ElementDiff {
    fn from(c: WireChanges) -> Self {
        Self {
            x: c.x,
            y: c.y,
            width: c.width,
            height: c.height,
            rotation: c.rotation,
            stroke_color: c.stroke_color,
            fill_color: c.fill_color,
            stroke_width: c.stroke_width,
            opacity: c.opacity,
            z_index: c.z_index,
            text: c.text,
        }
    }
}

// ===== Block extraction =====

/// Split a response into structured block bodies and the prose around them.
fn extract_blocks(text: &str) -> Result<(Vec<&str>, String), String> {
    let mut blocks = Vec::new();
    let mut prose = String::new();
    let mut cursor = 0;
    let mut open_at: Option<usize> = None;

    for tag in get_tag_regex().captures_iter(text) {
        let (Some(whole), Some(slash)) = (tag.get(0), tag.get(1)) else {
            continue;
        };
        let closing = !slash.as_str().is_empty();
        match (open_at, closing) {
            (None, false) => {
                prose.push_str(&text[cursor..whole.start()]);
                open_at = Some(whole.end());
            },
            (Some(start), true) => {
                blocks.push(text[start..whole.start()].trim());
                cursor = whole.end();
                open_at = None;
            },
            (Some(_), false) => return Err("nested <edit_plan> block".to_string()),
            (None, true) => return Err("</edit_plan> without an opening tag".to_string()),
        }
    }
    if open_at.is_some() {
        return Err("unterminated <edit_plan> block".to_string());
    }
    prose.push_str(&text[cursor..]);

    let prose = get_blank_lines_regex().replace_all(prose.trim(), "\n\n").into_owned();
    Ok((blocks, prose))
}

/// Drop a Markdown code fence around the JSON, if the model added one.
fn strip_fence(block: &str) -> &str {
    match get_fence_regex().captures(block).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => block,
    }
}

/// Decode one block into wire operations.
///
/// Accepts `{"operations": [...]}`, a bare array, or a single operation object.
fn decode_block(block: &str) -> Result<Vec<WireOperation>, String> {
    let json = strip_fence(block);
    if json.is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(json).map_err(|e| format!("invalid JSON: {}", e))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("operations") {
            Some(Value::Array(items)) if map.is_empty() => items,
            Some(Value::Array(_)) => {
                let extra: Vec<_> = map.keys().cloned().collect();
                return Err(format!("unexpected fields next to \"operations\": {}", extra.join(", ")));
            },
            Some(_) => return Err("\"operations\" must be an array".to_string()),
            None if map.contains_key("op") => vec![Value::Object(map)],
            None => return Err("expected an \"operations\" array".to_string()),
        },
        _ => return Err("expected a JSON object or array".to_string()),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<WireOperation>(item)
                .map_err(|e| format!("operations[{}]: {}", i, e))
        })
        .collect()
}

fn into_operation(wire: WireOperation, index: usize) -> Result<EditOperation, String> {
    Ok(match wire {
        WireOperation::Add { element } => EditOperation::AddElement {
            element: element.into_domain().map_err(|e| format!("operations[{}]: {}", index, e))?,
        },
        WireOperation::Modify { id, changes } => {
            let diff = ElementDiff::from(changes);
            if diff.is_empty() {
                return Err(format!("operations[{}]: modify of {} changes nothing", index, id));
            }
            EditOperation::ModifyElement { id, diff }
        },
        WireOperation::Delete { id } => EditOperation::DeleteElement { id },
        WireOperation::None => EditOperation::None,
    })
}

// ===== Reference validation =====

/// Walk the operations in order, tracking ids added and deleted by the plan itself.
///
/// A `text` change is only valid on a text element.
fn validate_references(operations: &[EditOperation], scene: &SceneModel, raw: &str) -> Result<(), PlanError> {
    let mut added: HashMap<&str, &ElementKind> = HashMap::new();
    let mut deleted: HashSet<&str> = HashSet::new();

    for op in operations {
        match op {
            EditOperation::AddElement { element } => {
                if let Some(id) = element.id.as_deref() {
                    if scene.contains_id(id) || added.contains_key(id) {
                        return Err(PlanError::DuplicateElement { id: id.to_string() });
                    }
                    added.insert(id, &element.kind);
                }
            },
            EditOperation::ModifyElement { id, .. } | EditOperation::DeleteElement { id } => {
                let kind = added
                    .get(id.as_str())
                    .copied()
                    .or_else(|| scene.get_live(id).map(|e| &e.kind));
                let Some(kind) = kind.filter(|_| !deleted.contains(id.as_str())) else {
                    return Err(PlanError::UnknownElement { id: id.clone() });
                };
                match op {
                    EditOperation::DeleteElement { .. } => {
                        deleted.insert(id.as_str());
                    },
                    EditOperation::ModifyElement { diff, .. }
                        if diff.text.is_some() && !matches!(kind, ElementKind::Text { .. }) =>
                    {
                        return Err(PlanError::MalformedPlan {
                            message: format!("text change on non-text element {} ({})", id, kind.label()),
                            raw: raw.to_string(),
                        });
                    },
                    _ => {},
                }
            },
            EditOperation::None => {},
        }
    }
    Ok(())
}

/// Parse a provider response into a validated plan.
///
/// No structured block yields a conversational plan with a single `none`
/// operation. Pure: the same text and scene always give the same result.
pub fn parse(response_text: &str, scene: &SceneModel) -> Result<EditPlan, PlanError> {
    let malformed = |message: String| PlanError::MalformedPlan { message, raw: response_text.to_string() };

    let (blocks, prose) = extract_blocks(response_text).map_err(malformed)?;
    if blocks.is_empty() {
        return Ok(EditPlan::conversational(prose));
    }

    let mut operations = Vec::new();
    for block in blocks {
        for wire in decode_block(block).map_err(malformed)? {
            operations.push(into_operation(wire, operations.len()).map_err(malformed)?);
        }
    }
    if operations.is_empty() {
        operations.push(EditOperation::None);
    }

    validate_references(&operations, scene, response_text)?;
    debug!("Parsed edit plan with {} operation(s)", operations.len());
    Ok(EditPlan { operations, prose })
}

//! Edit plan model: the validated output of one model turn.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::scene::{ElementKind, Geometry, Style};

/// Element description carried by an add operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewElement {
    /// Id requested by the model; generated at apply time when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub kind: ElementKind,
    pub geometry: Geometry,
    pub style: Style,
    /// Explicit stacking order; placed on top when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
}

/// Field-level changes for a modify operation. `None` leaves a field untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ElementDiff {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    /// Replacement content for text elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ElementDiff {
    /// Names of the fields this diff touches, in declaration order.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        let flags = [
            ("x", self.x.is_some()),
            ("y", self.y.is_some()),
            ("width", self.width.is_some()),
            ("height", self.height.is_some()),
            ("rotation", self.rotation.is_some()),
            ("strokeColor", self.stroke_color.is_some()),
            ("fillColor", self.fill_color.is_some()),
            ("strokeWidth", self.stroke_width.is_some()),
            ("opacity", self.opacity.is_some()),
            ("zIndex", self.z_index.is_some()),
            ("text", self.text.is_some()),
        ];
        for (name, set) in flags {
            if set {
                fields.push(name);
            }
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }
}

/// One mutation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOperation {
    AddElement { element: NewElement },
    ModifyElement { id: String, diff: ElementDiff },
    DeleteElement { id: String },
    /// Conversational turn with nothing to change
    None,
}

impl EditOperation {
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::AddElement { .. } => OperationKind::Add,
            Self::ModifyElement { .. } => OperationKind::Modify,
            Self::DeleteElement { .. } => OperationKind::Delete,
            Self::None => OperationKind::None,
        }
    }

    /// Existing element this operation targets, if any.
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Self::ModifyElement { id, .. } | Self::DeleteElement { id } => Some(id.as_str()),
            Self::AddElement { .. } | Self::None => None,
        }
    }
}

/// Operation category, used for credit pricing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Add,
    Modify,
    Delete,
    None,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Add => write!(f, "add"),
            Self::Modify => write!(f, "modify"),
            Self::Delete => write!(f, "delete"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Parsed and validated output of one model turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditPlan {
    pub operations: Vec<EditOperation>,
    /// Model text outside the structured block, for display
    pub prose: String,
}

impl EditPlan {
    /// A conversational-only plan.
    pub fn conversational(prose: impl Into<String>) -> Self {
        Self { operations: vec![EditOperation::None], prose: prose.into() }
    }

    /// Whether applying this plan would change the scene.
    pub fn has_mutations(&self) -> bool {
        self.operations.iter().any(|op| !matches!(op, EditOperation::None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_fields_in_order() {
        let diff = ElementDiff {
            y: Some(3.0),
            x: Some(1.0),
            fill_color: Some("#ff0000".to_string()),
            ..ElementDiff::default()
        };
        assert_eq!(diff.changed_fields(), vec!["x", "y", "fillColor"]);
        assert!(!diff.is_empty());
        assert!(ElementDiff::default().is_empty());
    }

    #[test]
    fn test_conversational_plan_has_no_mutations() {
        let plan = EditPlan::conversational("Hello!");
        assert_eq!(plan.operations, vec![EditOperation::None]);
        assert!(!plan.has_mutations());
    }

    #[test]
    fn test_target_id() {
        let op = EditOperation::DeleteElement { id: "shape-1".to_string() };
        assert_eq!(op.target_id(), Some("shape-1"));
        assert_eq!(op.kind(), OperationKind::Delete);
        assert_eq!(EditOperation::None.target_id(), None);
    }
}

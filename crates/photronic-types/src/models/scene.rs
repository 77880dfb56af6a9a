//! Scene element model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vector shape variants understood by the canvas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Diamond,
    Line,
    Arrow,
}

impl ShapeKind {
    pub const ALL: [Self; 5] = [Self::Rectangle, Self::Ellipse, Self::Diamond, Self::Line, Self::Arrow];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Diamond => "diamond",
            Self::Line => "line",
            Self::Arrow => "arrow",
        }
    }

    /// Parse from the lowercase wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variant-specific payload of a scene element.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    Shape {
        shape: ShapeKind,
    },
    Image {
        #[serde(rename = "fileId")]
        file_id: String,
        #[serde(rename = "mimeType", default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
    Text {
        text: String,
        #[serde(rename = "fontSize")]
        font_size: f64,
    },
}

impl ElementKind {
    /// Short type label used in scene summaries and generated ids.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Shape { shape } => shape.as_str(),
            Self::Image { .. } => "image",
            Self::Text { .. } => "text",
        }
    }

    /// Prefix for generated element ids.
    pub const fn id_prefix(&self) -> &'static str {
        match self {
            Self::Shape { .. } => "shape",
            Self::Image { .. } => "image",
            Self::Text { .. } => "text",
        }
    }
}

/// Position, size and rotation of an element in scene coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in radians around the element center
    #[serde(default)]
    pub rotation: f64,
}

impl Geometry {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height, rotation: 0.0 }
    }

    /// Whether width and height are both finite and strictly positive.
    pub fn has_positive_size(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Whether every component is a finite number.
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height, self.rotation].iter().all(|v| v.is_finite())
    }

    /// Axis-aligned bounds, ignoring rotation.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox { x: self.x, y: self.y, width: self.width, height: self.height }
    }
}

/// Axis-aligned rectangle in scene coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// A point in scene coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Stroke and fill attributes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub stroke_color: String,
    pub fill_color: String,
    pub stroke_width: f64,
    /// Opacity in percent (0..=100)
    pub opacity: u8,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke_color: "#1e1e1e".to_string(),
            fill_color: "transparent".to_string(),
            stroke_width: 1.0,
            opacity: 100,
        }
    }
}

impl Style {
    /// Style for imported images (no stroke, no fill).
    pub fn transparent() -> Self {
        Self {
            stroke_color: "transparent".to_string(),
            fill_color: "transparent".to_string(),
            ..Self::default()
        }
    }
}

/// A single element on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SceneElement {
    /// Unique, session-stable identifier
    pub id: String,
    #[serde(flatten)]
    pub kind: ElementKind,
    pub geometry: Geometry,
    #[serde(default)]
    pub style: Style,
    /// Stacking order; higher draws on top
    #[serde(default)]
    pub z_index: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_ids: Vec<String>,
    #[serde(default)]
    pub locked: bool,
    /// Tombstone flag; deleted elements keep their id reserved
    #[serde(default)]
    pub is_deleted: bool,
    /// Incremented on every mutation
    #[serde(default = "default_version")]
    pub version: u32,
}

const fn default_version() -> u32 {
    1
}

impl SceneElement {
    pub fn new(id: impl Into<String>, kind: ElementKind, geometry: Geometry) -> Self {
        Self {
            id: id.into(),
            kind,
            geometry,
            style: Style::default(),
            z_index: 0,
            group_ids: Vec::new(),
            locked: false,
            is_deleted: false,
            version: 1,
        }
    }

    /// Present and not tombstoned.
    pub const fn is_live(&self) -> bool {
        !self.is_deleted
    }

    pub fn bounds(&self) -> BoundingBox {
        self.geometry.bounds()
    }

    /// Record a mutation.
    pub fn bump_version(&mut self) {
        self.version = self.version.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_kind_names_round_trip() {
        for kind in ShapeKind::ALL {
            assert_eq!(ShapeKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(ShapeKind::from_name("circle"), None);
    }

    #[test]
    fn test_bounds_contains_edges() {
        let bounds = Geometry::new(10.0, 10.0, 20.0, 20.0).bounds();
        assert!(bounds.contains(Point::new(10.0, 30.0)));
        assert!(!bounds.contains(Point::new(31.0, 15.0)));
    }

    #[test]
    fn test_positive_size_rejects_nan_and_zero() {
        assert!(Geometry::new(0.0, 0.0, 1.0, 1.0).has_positive_size());
        assert!(!Geometry::new(0.0, 0.0, 0.0, 1.0).has_positive_size());
        assert!(!Geometry::new(0.0, 0.0, f64::NAN, 1.0).has_positive_size());
    }

    #[test]
    fn test_element_serializes_with_flattened_kind() {
        let element = SceneElement::new(
            "image-1",
            ElementKind::Image { file_id: "cat.png".to_string(), mime_type: None },
            Geometry::new(0.0, 0.0, 640.0, 480.0),
        );
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["fileId"], "cat.png");
        assert_eq!(json["isDeleted"], false);

        let back: SceneElement = serde_json::from_value(json).unwrap();
        assert_eq!(back, element);
    }
}

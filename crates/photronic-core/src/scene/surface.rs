//! Rendering surface boundary.
//!
//! The canvas widget is an external collaborator. The core depends on these
//! five capabilities and nothing richer.

use photronic_types::models::Point;
use photronic_types::SceneElement;

pub trait RenderSurface: Send {
    /// Replace the displayed elements with this snapshot.
    fn render(&mut self, elements: &[SceneElement]);

    /// Id of the top-most live element under the point.
    fn hit_test(&self, point: Point) -> Option<String>;

    /// Current elements, including any edits the user made directly on the canvas.
    fn export_elements(&self) -> Vec<SceneElement>;

    /// Append elements (replacing any with the same id).
    fn add_elements(&mut self, elements: Vec<SceneElement>);

    /// Clear the canvas.
    fn reset_scene(&mut self);
}

/// Headless surface that keeps the last rendered snapshot in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySurface {
    elements: Vec<SceneElement>,
    renders: u64,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `render` calls so far.
    pub const fn render_count(&self) -> u64 {
        self.renders
    }
}

impl RenderSurface for MemorySurface {
    fn render(&mut self, elements: &[SceneElement]) {
        self.elements = elements.to_vec();
        self.renders = self.renders.saturating_add(1);
    }

    fn hit_test(&self, point: Point) -> Option<String> {
        // Later elements win ties, matching paint order.
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_live() && e.bounds().contains(point))
            .max_by_key(|(index, e)| (e.z_index, *index))
            .map(|(_, e)| e.id.clone())
    }

    fn export_elements(&self) -> Vec<SceneElement> {
        self.elements.clone()
    }

    fn add_elements(&mut self, elements: Vec<SceneElement>) {
        for element in elements {
            match self.elements.iter_mut().find(|e| e.id == element.id) {
                Some(existing) => *existing = element,
                None => self.elements.push(element),
            }
        }
    }

    fn reset_scene(&mut self) {
        self.elements.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photronic_types::{ElementKind, Geometry, ShapeKind};

    fn shape(id: &str, x: f64, z: i64) -> SceneElement {
        let mut element = SceneElement::new(
            id,
            ElementKind::Shape { shape: ShapeKind::Rectangle },
            Geometry::new(x, 0.0, 100.0, 100.0),
        );
        element.z_index = z;
        element
    }

    #[test]
    fn test_hit_test_prefers_highest_z() {
        let mut surface = MemorySurface::new();
        surface.add_elements(vec![shape("high", 0.0, 3), shape("low", 50.0, 1)]);

        assert_eq!(surface.hit_test(Point::new(60.0, 10.0)).as_deref(), Some("high"));
        assert_eq!(surface.hit_test(Point::new(120.0, 10.0)).as_deref(), Some("low"));
        assert_eq!(surface.hit_test(Point::new(500.0, 10.0)), None);
    }

    #[test]
    fn test_hit_test_skips_tombstones() {
        let mut deleted = shape("deleted", 0.0, 9);
        deleted.is_deleted = true;

        let mut surface = MemorySurface::new();
        surface.render(&[shape("base", 0.0, 0), deleted]);
        assert_eq!(surface.hit_test(Point::new(10.0, 10.0)).as_deref(), Some("base"));
        assert_eq!(surface.render_count(), 1);
    }

    #[test]
    fn test_add_replaces_same_id_and_reset_clears() {
        let mut surface = MemorySurface::new();
        surface.add_elements(vec![shape("a", 0.0, 0)]);
        surface.add_elements(vec![shape("a", 30.0, 0)]);

        let exported = surface.export_elements();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].geometry.x, 30.0);

        surface.reset_scene();
        assert!(surface.export_elements().is_empty());
    }
}

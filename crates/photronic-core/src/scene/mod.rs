//! In-memory scene model.
//!
//! Elements keep insertion order. Deleted elements stay in the list as
//! tombstones so their ids remain reserved for the whole session.

mod summary;
mod surface;

pub use summary::{ElementSummary, SceneSummary};
pub use surface::{MemorySurface, RenderSurface};

use photronic_types::{ElementKind, PlanError, SceneElement};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneModel {
    elements: Vec<SceneElement>,
}

impl SceneModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from a surface export. Duplicate ids keep the last occurrence.
    pub fn from_elements(elements: Vec<SceneElement>) -> Self {
        let mut scene = Self::new();
        for element in elements {
            if let Some(existing) = scene.elements.iter_mut().find(|e| e.id == element.id) {
                warn!("Duplicate element id {} in import, keeping the later copy", element.id);
                *existing = element;
            } else {
                scene.elements.push(element);
            }
        }
        scene
    }

    /// All elements, tombstones included.
    pub fn elements(&self) -> &[SceneElement] {
        &self.elements
    }

    /// Elements that are not tombstoned.
    pub fn live_elements(&self) -> impl Iterator<Item = &SceneElement> {
        self.elements.iter().filter(|e| e.is_live())
    }

    pub fn live_count(&self) -> usize {
        self.live_elements().count()
    }

    pub fn is_empty(&self) -> bool {
        self.live_count() == 0
    }

    /// Look up an element, tombstoned or not.
    pub fn get(&self, id: &str) -> Option<&SceneElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Look up a live element.
    pub fn get_live(&self, id: &str) -> Option<&SceneElement> {
        self.get(id).filter(|e| e.is_live())
    }

    pub(crate) fn get_live_mut(&mut self, id: &str) -> Option<&mut SceneElement> {
        self.elements.iter_mut().find(|e| e.id == id && e.is_live())
    }

    /// Whether the id is reserved (live or tombstoned).
    pub fn contains_id(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn is_live(&self, id: &str) -> bool {
        self.get_live(id).is_some()
    }

    /// Add a new element. Ids must be unused, tombstones included.
    pub fn insert(&mut self, element: SceneElement) -> Result<(), PlanError> {
        if self.contains_id(&element.id) {
            return Err(PlanError::DuplicateElement { id: element.id });
        }
        self.elements.push(element);
        Ok(())
    }

    /// Soft-delete a live element.
    pub fn tombstone(&mut self, id: &str) -> Result<(), PlanError> {
        let element = self
            .get_live_mut(id)
            .ok_or_else(|| PlanError::UnknownElement { id: id.to_string() })?;
        element.is_deleted = true;
        element.bump_version();
        Ok(())
    }

    /// Lock or unlock a live element (user-side action, not available to the model).
    pub fn set_locked(&mut self, id: &str, locked: bool) -> Result<(), PlanError> {
        let element = self
            .get_live_mut(id)
            .ok_or_else(|| PlanError::UnknownElement { id: id.to_string() })?;
        if element.locked != locked {
            element.locked = locked;
            element.bump_version();
        }
        Ok(())
    }

    /// Stacking index that places a new element above everything live.
    pub fn next_z_index(&self) -> i64 {
        self.live_elements().map(|e| e.z_index).max().map_or(0, |z| z.saturating_add(1))
    }

    /// Generate an unused id such as `shape-1a2b3c4d`.
    pub fn generate_id(&self, kind: &ElementKind) -> String {
        loop {
            let suffix = uuid::Uuid::new_v4().simple().to_string();
            let id = format!("{}-{}", kind.id_prefix(), &suffix[..8]);
            if !self.contains_id(&id) {
                return id;
            }
        }
    }

    /// Compact description sent to the model.
    pub fn summary(&self) -> SceneSummary {
        SceneSummary::from_scene(self)
    }
}

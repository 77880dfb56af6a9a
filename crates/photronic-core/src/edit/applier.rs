//! Edit applier.
//!
//! Applies a validated plan to a clone of the scene. The clone and the
//! debited account are returned only when every operation succeeds, so a
//! failure anywhere leaves the caller's scene and account untouched.

use photronic_types::models::{CostTable, OperationKind};
use photronic_types::{
    Account, EditOperation, EditPlan, ElementDiff, ElementKind, Geometry, NewElement, PlanError,
    SceneElement,
};
use serde::Serialize;
use tracing::debug;

use super::{clamp_opacity, clamp_stroke_width};
use crate::scene::SceneModel;

/// One operation as it was applied, for chat feedback and undo logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedOperation {
    pub kind: OperationKind,
    /// Element created, changed or deleted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppliedResult {
    pub scene: SceneModel,
    pub account: Account,
    pub applied: Vec<AppliedOperation>,
    /// Credits debited
    pub cost: u64,
    /// Natural-language description of the changes, one line per operation
    pub summary: String,
}

/// Apply `plan` atomically.
///
/// Credits are checked before any operation runs. Every error leaves the
/// inputs unchanged; they are only read here.
pub fn apply(
    plan: &EditPlan,
    scene: &SceneModel,
    account: &Account,
    costs: &CostTable,
) -> Result<AppliedResult, PlanError> {
    let cost = costs.total(&plan.operations);
    let debited = account
        .debited(cost)
        .ok_or(PlanError::InsufficientCredits { required: cost, available: account.credits })?;

    let mut next = scene.clone();
    let mut applied = Vec::with_capacity(plan.operations.len());
    for op in &plan.operations {
        applied.push(apply_operation(&mut next, op)?);
    }

    let summary = applied
        .iter()
        .filter(|a| a.kind != OperationKind::None)
        .map(|a| a.description.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    debug!("Applied {} operation(s), cost {}", applied.len(), cost);
    Ok(AppliedResult { scene: next, account: debited, applied, cost, summary })
}

fn apply_operation(scene: &mut SceneModel, op: &EditOperation) -> Result<AppliedOperation, PlanError> {
    match op {
        EditOperation::AddElement { element } => add_element(scene, element),
        EditOperation::ModifyElement { id, diff } => modify_element(scene, id, diff),
        EditOperation::DeleteElement { id } => delete_element(scene, id),
        EditOperation::None => Ok(AppliedOperation {
            kind: OperationKind::None,
            element_id: None,
            description: "No change".to_string(),
        }),
    }
}

fn check_geometry(target: &str, geometry: &Geometry) -> Result<(), PlanError> {
    if geometry.is_finite() && geometry.has_positive_size() {
        Ok(())
    } else {
        Err(PlanError::InvalidGeometry {
            target: target.to_string(),
            width: geometry.width,
            height: geometry.height,
        })
    }
}

fn add_element(scene: &mut SceneModel, element: &NewElement) -> Result<AppliedOperation, PlanError> {
    check_geometry(element.id.as_deref().unwrap_or("new element"), &element.geometry)?;

    let id = match &element.id {
        Some(id) => id.clone(),
        None => scene.generate_id(&element.kind),
    };
    let mut style = element.style.clone();
    style.stroke_width = clamp_stroke_width(style.stroke_width);
    style.opacity = style.opacity.min(100);

    let mut created = SceneElement::new(id.clone(), element.kind.clone(), element.geometry);
    created.style = style;
    created.z_index = element.z_index.unwrap_or_else(|| scene.next_z_index());
    scene.insert(created)?;

    let g = element.geometry;
    Ok(AppliedOperation {
        kind: OperationKind::Add,
        description: format!(
            "Added {} {} at ({}, {}), size {}×{}",
            element.kind.label(),
            id,
            round2(g.x),
            round2(g.y),
            round2(g.width),
            round2(g.height)
        ),
        element_id: Some(id),
    })
}

fn modify_element(scene: &mut SceneModel, id: &str, diff: &ElementDiff) -> Result<AppliedOperation, PlanError> {
    let element =
        scene.get_live_mut(id).ok_or_else(|| PlanError::UnknownElement { id: id.to_string() })?;
    if element.locked {
        return Err(PlanError::ElementLocked { id: id.to_string() });
    }

    if diff.text.is_some() && !matches!(element.kind, ElementKind::Text { .. }) {
        return Err(PlanError::MalformedPlan {
            message: format!("text change on non-text element {} ({})", id, element.kind.label()),
            raw: String::new(),
        });
    }

    let mut geometry = element.geometry;
    geometry.x = diff.x.unwrap_or(geometry.x);
    geometry.y = diff.y.unwrap_or(geometry.y);
    geometry.width = diff.width.unwrap_or(geometry.width);
    geometry.height = diff.height.unwrap_or(geometry.height);
    geometry.rotation = diff.rotation.unwrap_or(geometry.rotation);
    check_geometry(id, &geometry)?;

    element.geometry = geometry;
    if let Some(color) = &diff.stroke_color {
        element.style.stroke_color = color.clone();
    }
    if let Some(color) = &diff.fill_color {
        element.style.fill_color = color.clone();
    }
    if let Some(width) = diff.stroke_width {
        element.style.stroke_width = clamp_stroke_width(width);
    }
    if let Some(opacity) = diff.opacity {
        element.style.opacity = clamp_opacity(opacity);
    }
    if let Some(z) = diff.z_index {
        element.z_index = z;
    }
    if let (Some(new_text), ElementKind::Text { text, .. }) = (&diff.text, &mut element.kind) {
        *text = new_text.clone();
    }
    element.bump_version();

    Ok(AppliedOperation {
        kind: OperationKind::Modify,
        element_id: Some(id.to_string()),
        description: format!("Updated {} ({})", id, diff.changed_fields().join(", ")),
    })
}

fn delete_element(scene: &mut SceneModel, id: &str) -> Result<AppliedOperation, PlanError> {
    let element = scene.get_live(id).ok_or_else(|| PlanError::UnknownElement { id: id.to_string() })?;
    if element.locked {
        return Err(PlanError::ElementLocked { id: id.to_string() });
    }
    scene.tombstone(id)?;

    Ok(AppliedOperation {
        kind: OperationKind::Delete,
        element_id: Some(id.to_string()),
        description: format!("Deleted {}", id),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use photronic_types::models::Style;
    use photronic_types::ShapeKind;

    fn rect(id: &str) -> SceneElement {
        SceneElement::new(
            id,
            ElementKind::Shape { shape: ShapeKind::Rectangle },
            Geometry::new(0.0, 0.0, 10.0, 10.0),
        )
    }

    fn add(id: Option<&str>, geometry: Geometry) -> EditOperation {
        EditOperation::AddElement {
            element: NewElement {
                id: id.map(str::to_string),
                kind: ElementKind::Shape { shape: ShapeKind::Ellipse },
                geometry,
                style: Style::default(),
                z_index: None,
            },
        }
    }

    fn plan(operations: Vec<EditOperation>) -> EditPlan {
        EditPlan { operations, prose: String::new() }
    }

    #[test]
    fn test_add_generates_id_and_debits() {
        let scene = SceneModel::from_elements(vec![rect("base")]);
        let account = Account::new("Guest", 3);
        let result = apply(
            &plan(vec![add(None, Geometry::new(-10.0, -10.0, 40.0, 40.0))]),
            &scene,
            &account,
            &CostTable::default(),
        )
        .unwrap();

        assert_eq!(result.cost, 1);
        assert_eq!(result.account.credits, 2);
        assert_eq!(result.scene.live_count(), 2);

        let id = result.applied[0].element_id.clone().unwrap();
        assert!(id.starts_with("shape-"));
        let created = result.scene.get(&id).unwrap();
        assert_eq!(created.bounds(), Geometry::new(-10.0, -10.0, 40.0, 40.0).bounds());
        assert_eq!(created.z_index, 1);
        assert_eq!(result.summary, format!("Added ellipse {} at (-10, -10), size 40×40", id));
    }

    #[test]
    fn test_modify_applies_diff_and_clamps() {
        let scene = SceneModel::from_elements(vec![rect("a")]);
        let diff = ElementDiff {
            x: Some(5.0),
            fill_color: Some("#ff0000".into()),
            opacity: Some(140.0),
            stroke_width: Some(-1.0),
            ..ElementDiff::default()
        };
        let result = apply(
            &plan(vec![EditOperation::ModifyElement { id: "a".into(), diff }]),
            &scene,
            &Account::guest(),
            &CostTable::default(),
        )
        .unwrap();

        let element = result.scene.get("a").unwrap();
        assert_eq!(element.geometry.x, 5.0);
        assert_eq!(element.style.fill_color, "#ff0000");
        assert_eq!(element.style.opacity, 100);
        assert_eq!(element.style.stroke_width, 0.0);
        assert_eq!(element.version, 2);
        assert_eq!(result.summary, "Updated a (x, fillColor, strokeWidth, opacity)");
    }

    #[test]
    fn test_failure_midway_leaves_inputs_untouched() {
        let scene = SceneModel::from_elements(vec![rect("a"), rect("b")]);
        let account = Account::new("Guest", 5);
        let before = (scene.clone(), account.clone());

        let bad = EditOperation::ModifyElement {
            id: "b".into(),
            diff: ElementDiff { width: Some(0.0), ..ElementDiff::default() },
        };
        let err = apply(
            &plan(vec![EditOperation::DeleteElement { id: "a".into() }, bad]),
            &scene,
            &account,
            &CostTable::default(),
        )
        .unwrap_err();

        assert_eq!(err, PlanError::InvalidGeometry { target: "b".into(), width: 0.0, height: 10.0 });
        assert_eq!((scene, account), before);
    }

    #[test]
    fn test_insufficient_credits_checked_first() {
        let scene = SceneModel::new();
        let err = apply(
            &plan(vec![add(None, Geometry::new(0.0, 0.0, 1.0, 1.0))]),
            &scene,
            &Account::new("Broke", 0),
            &CostTable::default(),
        )
        .unwrap_err();
        assert_eq!(err, PlanError::InsufficientCredits { required: 1, available: 0 });
        assert!(scene.is_empty());
    }

    #[test]
    fn test_conversational_plan_is_free() {
        let scene = SceneModel::from_elements(vec![rect("a")]);
        let result = apply(
            &EditPlan::conversational("hi"),
            &scene,
            &Account::new("Broke", 0),
            &CostTable::default(),
        )
        .unwrap();
        assert_eq!(result.cost, 0);
        assert_eq!(result.scene, scene);
        assert!(result.summary.is_empty());
    }

    #[test]
    fn test_locked_elements_reject_changes() {
        let mut locked = rect("photo");
        locked.locked = true;
        let scene = SceneModel::from_elements(vec![locked]);

        for op in [
            EditOperation::DeleteElement { id: "photo".into() },
            EditOperation::ModifyElement {
                id: "photo".into(),
                diff: ElementDiff { x: Some(1.0), ..ElementDiff::default() },
            },
        ] {
            let err = apply(&plan(vec![op]), &scene, &Account::guest(), &CostTable::default())
                .unwrap_err();
            assert_eq!(err, PlanError::ElementLocked { id: "photo".into() });
        }
    }

    #[test]
    fn test_invalid_add_geometry() {
        let err = apply(
            &plan(vec![add(Some("c"), Geometry::new(0.0, 0.0, 10.0, -3.0))]),
            &SceneModel::new(),
            &Account::guest(),
            &CostTable::default(),
        )
        .unwrap_err();
        assert_eq!(err, PlanError::InvalidGeometry { target: "c".into(), width: 10.0, height: -3.0 });
    }

    #[test]
    fn test_delete_tombstones_and_modify_text() {
        let text = SceneElement::new(
            "label",
            ElementKind::Text { text: "old".into(), font_size: 20.0 },
            Geometry::new(0.0, 0.0, 50.0, 20.0),
        );
        let scene = SceneModel::from_elements(vec![rect("a"), text]);
        let result = apply(
            &plan(vec![
                EditOperation::DeleteElement { id: "a".into() },
                EditOperation::ModifyElement {
                    id: "label".into(),
                    diff: ElementDiff { text: Some("new".into()), ..ElementDiff::default() },
                },
            ]),
            &scene,
            &Account::guest(),
            &CostTable::default(),
        )
        .unwrap();

        assert!(result.scene.contains_id("a"));
        assert!(!result.scene.is_live("a"));
        assert!(matches!(
            &result.scene.get("label").unwrap().kind,
            ElementKind::Text { text, .. } if text == "new"
        ));
        assert_eq!(result.account.credits, 4);
    }

    #[test]
    fn test_text_change_on_shape_is_rejected_without_charge() {
        let scene = SceneModel::from_elements(vec![rect("a")]);
        let account = Account::new("Guest", 5);
        let err = apply(
            &plan(vec![EditOperation::ModifyElement {
                id: "a".into(),
                diff: ElementDiff { text: Some("hello".into()), ..ElementDiff::default() },
            }]),
            &scene,
            &account,
            &CostTable::default(),
        )
        .unwrap_err();

        assert!(matches!(err, PlanError::MalformedPlan { ref message, .. } if message.contains("non-text")));
        assert_eq!(scene.get("a").unwrap().version, 1);
        assert_eq!(account.credits, 5);
    }
}

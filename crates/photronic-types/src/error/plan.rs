//! Edit-plan validation and application errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while parsing or applying an edit plan.
///
/// Every variant leaves the scene and the account untouched.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum PlanError {
    /// The structured block failed schema validation
    #[error("Could not understand the edit plan: {message}")]
    MalformedPlan {
        message: String,
        /// Full response text, kept for display
        raw: String,
    },

    /// A modify/delete references an id that is absent or tombstoned
    #[error("Element not found: {id}")]
    UnknownElement { id: String },

    /// An add operation reuses an id that already exists in the scene
    #[error("Element id already in use: {id}")]
    DuplicateElement { id: String },

    /// The target element is locked against edits
    #[error("Element {id} is locked")]
    ElementLocked { id: String },

    /// An operation specifies a non-positive or non-finite size
    #[error("Invalid geometry for {target}: width={width}, height={height}")]
    InvalidGeometry {
        /// Element id, or "new element" for adds
        target: String,
        width: f64,
        height: f64,
    },

    /// The account cannot pay for the plan
    #[error("Insufficient credits: plan costs {required}, balance is {available}")]
    InsufficientCredits { required: u64, available: u64 },
}

impl PlanError {
    /// Whether the failure happened during validation (before any apply attempt).
    pub const fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedPlan { .. } | Self::UnknownElement { .. } | Self::DuplicateElement { .. }
        )
    }
}

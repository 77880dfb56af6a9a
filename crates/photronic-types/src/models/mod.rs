//! Core domain models for Photronic.
//!
//! This module contains all shared data structures used across the Photronic workspace.

mod account;
mod chat;
pub mod config;
mod plan;
mod scene;

// Re-export all models
pub use account::{Account, CreditPackage, CREDIT_PACKAGES};
pub use chat::{ChatMessage, Role};
pub use config::{
    AppConfig, ConversationConfig, CostTable, EditConfig, GeminiConfig, HistoryWindow, LlmConfig,
    OpenAiCompatibleConfig, ProviderKind,
};
pub use plan::{EditOperation, EditPlan, ElementDiff, NewElement, OperationKind};
pub use scene::{BoundingBox, ElementKind, Geometry, Point, SceneElement, ShapeKind, Style};

//! # Photronic Types
//!
//! Core types, models, and error definitions for the Photronic scene editor.
//!
//! This crate provides the foundational type system for the Photronic workspace:
//!
//! - **`error`** - Typed error hierarchy for sessions, providers, edit plans, and configuration
//! - **`models`** - Domain models (Scene elements, Edit plans, Chat messages, Account, Config)
//! - **`protocol`** - Gemini/OpenAI-compatible wire types
//!
//! ## Architecture Role
//!
//! `photronic-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!          photronic-types (this crate)
//!                  │
//!                  ▼
//!           photronic-core
//!                  │
//!                  ▼
//!           photronic-cli
//! ```
//!
//! All types are designed to be:
//! - **Serializable** via serde for snapshots and provider payloads
//! - **Clone** for cheap sharing across async boundaries
//! - **PartialEq** for testing and comparison

pub mod error;
pub mod models;
pub mod protocol;

// Re-export error types for convenience
pub use error::{ConfigError, PlanError, ProviderError, Result, SessionError, TypedError};

// Re-export core model types
pub use models::{
    Account, AppConfig, ChatMessage, EditOperation, EditPlan, ElementDiff, ElementKind, Geometry,
    LlmConfig, NewElement, ProviderKind, Role, SceneElement, ShapeKind, Style,
};

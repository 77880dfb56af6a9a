//! # Photronic Core
//!
//! The scene edit pipeline behind the Photronic chat panel.
//!
//! ## Architecture
//!
//! ```text
//! user text
//!    │
//!    ▼
//! conversation/   append + build ProviderRequest (history window + scene summary)
//!    │
//!    ▼
//! provider/       Gemini | OpenAI-compatible adapter (timeout + cancellation)
//!    │
//!    ▼
//! edit/parser     <edit_plan> block → validated EditPlan
//!    │
//!    ▼
//! edit/applier    atomic apply on a cloned scene, credit debit
//!    │
//!    ▼
//! orchestrator/   one cycle at a time, errors surfaced as chat turns
//! ```
//!
//! `session` wraps the orchestrator with sign-in state, image uploads and the
//! rendering surface; `modules` holds config persistence and paths.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp))]

pub mod conversation;
pub mod edit;
pub mod error;
pub mod modules;
pub mod orchestrator;
pub mod provider;
pub mod scene;
pub mod session;

// Re-export commonly used types
pub use error::{AppError, AppResult};
pub use orchestrator::{CycleOutcome, CycleState, Orchestrator};
pub use photronic_types as types;
pub use provider::{ChatProvider, ProviderAdapter, ProviderRequest, ProviderResponse};
pub use scene::{MemorySurface, RenderSurface, SceneModel};
pub use session::EditorSession;

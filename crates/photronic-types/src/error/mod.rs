//! Typed error definitions for Photronic.
//!
//! This module provides a structured error hierarchy with specific error types
//! for different domains. All errors are designed to be:
//!
//! - **Serializable** for snapshots and UI bridges via serde
//! - **Displayable** for logging and chat surfacing via Display trait
//! - **Matchable** for error handling logic via enum variants
//! - **Composable** via thiserror derive macros

mod config;
mod plan;
mod provider;
mod session;

pub use config::ConfigError;
pub use plan::PlanError;
pub use provider::ProviderError;
pub use session::SessionError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix that marks a model turn as a surfaced error.
pub const ERROR_PREFIX: &str = "Error: ";

/// Unified error type that wraps all domain-specific errors.
///
/// This is what the orchestrator hands back to callers after an edit cycle fails.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[serde(tag = "domain", content = "error")]
pub enum TypedError {
    /// Input was rejected before it entered the conversation
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The chat-completion backend could not produce a response
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The model's edit plan was rejected or could not be applied
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// Configuration could not be loaded, validated, or saved
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TypedError {
    /// Text of the model turn that surfaces this error in the chat.
    pub fn user_message(&self) -> String {
        format!("{}{}", ERROR_PREFIX, self)
    }

    /// Whether this error is a cancelled provider call (a silent transition, not a failure).
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Provider(ProviderError::Cancelled))
    }

    /// Whether the input was rejected before being appended to the conversation.
    pub const fn rejects_input(&self) -> bool {
        matches!(self, Self::Session(_))
    }
}

/// Standard Result type using TypedError.
pub type Result<T> = std::result::Result<T, TypedError>;

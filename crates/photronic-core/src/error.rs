//! Unified error types for Photronic Core infrastructure.
//!
//! Edit-cycle failures use [`photronic_types::TypedError`]; this type covers
//! the filesystem and serialization work around it.

use photronic_types::{ConfigError, TypedError};
use serde::Serialize;
use thiserror::Error;

/// Error type for config persistence and other non-cycle operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    /// File system I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An edit cycle or session operation failed.
    #[error(transparent)]
    Edit(#[from] TypedError),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

/// Result type alias for Photronic Core operations.
pub type AppResult<T> = Result<T, AppError>;

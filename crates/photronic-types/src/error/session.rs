//! Session and input errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that reject a chat submission before it enters the conversation.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum SessionError {
    /// Message is blank after trimming
    #[error("Message is empty")]
    EmptyInput,

    /// Another edit cycle is still in flight
    #[error("An edit is already in progress ({state})")]
    Busy {
        /// State the orchestrator was in when the submission arrived
        state: String,
    },

    /// No account is signed in
    #[error("Sign in to start editing")]
    NotSignedIn,
}

//! Chat message model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::User => write!(f, "user"),
            Self::Model => write!(f, "model"),
        }
    }
}

/// One immutable entry in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Logical sequence number; strictly increasing within a conversation
    pub seq: u64,
    /// Wall-clock time of the append (unix seconds)
    pub created_at: i64,
    /// Model turn that surfaces an error rather than a provider reply
    #[serde(default)]
    pub is_error: bool,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>, seq: u64) -> Self {
        Self {
            role,
            content: content.into(),
            seq,
            created_at: chrono::Utc::now().timestamp(),
            is_error: false,
        }
    }

    /// Whether this turn should be replayed to the provider.
    pub const fn is_replayable(&self) -> bool {
        !self.is_error
    }
}

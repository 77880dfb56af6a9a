//! Configuration enums for provider selection and history windowing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Chat-completion backend family.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Google Gemini GenerateContent API
    #[default]
    Gemini,
    /// Any OpenAI ChatCompletions-compatible endpoint (OpenAI, OpenRouter, ...)
    #[serde(alias = "openai")]
    OpenAiCompatible,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Gemini => write!(f, "gemini"),
            Self::OpenAiCompatible => write!(f, "openai_compatible"),
        }
    }
}

impl ProviderKind {
    /// Parse from string. Unknown names yield `None`.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            "openai" | "openai_compatible" | "openai-compatible" | "openrouter" => {
                Some(Self::OpenAiCompatible)
            },
            _ => None,
        }
    }

    /// Human-facing provider name used in messages.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenAiCompatible => "OpenAI-compatible",
        }
    }
}

/// How much conversation history is replayed to the provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HistoryWindow {
    /// Every replayable message
    #[default]
    All,
    /// Only the most recent K messages
    Last(usize),
}

impl fmt::Display for HistoryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::All => write!(f, "all"),
            Self::Last(k) => write!(f, "last:{}", k),
        }
    }
}

impl HistoryWindow {
    /// Parse `all` or `last:K`.
    pub fn from_string(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        if s == "all" {
            return Some(Self::All);
        }
        s.strip_prefix("last:").and_then(|k| k.trim().parse().ok()).map(Self::Last)
    }
}

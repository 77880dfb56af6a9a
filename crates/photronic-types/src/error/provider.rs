//! Provider-related errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while calling a chat-completion backend.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ProviderError {
    /// A required credential or endpoint is not configured
    #[error("{provider} {field} is not set. Please configure it in the settings.")]
    MissingCredential {
        /// Provider the credential belongs to
        provider: String,
        /// Name of the missing setting ("API key", "endpoint")
        field: String,
    },

    /// Network failure, non-2xx status, or an unusable response body
    #[error("{provider} unavailable: {message}")]
    Unavailable {
        provider: String,
        /// HTTP status when the backend answered
        status: Option<u16>,
        message: String,
    },

    /// No response within the configured bound
    #[error("{provider} did not respond within {duration_secs}s")]
    Timeout { provider: String, duration_secs: u64 },

    /// The caller abandoned the request
    #[error("Request cancelled")]
    Cancelled,
}

impl ProviderError {
    /// Build an `Unavailable` error for a transport failure.
    pub fn network(provider: &str, message: impl Into<String>) -> Self {
        Self::Unavailable { provider: provider.to_string(), status: None, message: message.into() }
    }

    /// Build an `Unavailable` error for a non-2xx response.
    pub fn http(provider: &str, status: u16, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, truncate(body, 300))
        };
        Self::Unavailable { provider: provider.to_string(), status: Some(status), message }
    }

    /// Check if a caller-side retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Unavailable { status, .. } => {
                status.map_or(true, |code| code == 429 || code >= 500)
            },
            Self::MissingCredential { .. } | Self::Cancelled => false,
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_message() {
        let err = ProviderError::MissingCredential {
            provider: "Gemini".to_string(),
            field: "API key".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Gemini API key is not set. Please configure it in the settings."
        );
    }

    #[test]
    fn test_http_error_truncates_body() {
        let body = "x".repeat(1000);
        let err = ProviderError::http("openai", 502, &body);
        let msg = err.to_string();
        assert!(msg.contains("HTTP 502"));
        assert!(msg.len() < 400);
    }

    #[test]
    fn test_is_transient() {
        assert!(ProviderError::http("openai", 503, "").is_transient());
        assert!(ProviderError::http("openai", 429, "").is_transient());
        assert!(!ProviderError::http("openai", 401, "").is_transient());
        assert!(ProviderError::network("gemini", "connection reset").is_transient());
        assert!(!ProviderError::Cancelled.is_transient());
    }
}

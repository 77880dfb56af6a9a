//! Chat-completion provider adapters.
//!
//! Every backend implements [`ChatProvider`]. Wire formats stay inside the
//! variant modules; the rest of the crate only sees [`ProviderRequest`] and
//! [`ProviderResponse`].

mod client_builder;
mod gemini;
mod openai;

pub use client_builder::build_http_client;
pub use gemini::GeminiProvider;
pub use openai::OpenAiCompatibleProvider;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use photronic_types::models::ProviderKind;
use photronic_types::{LlmConfig, ProviderError, Role};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// One replayed conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestTurn {
    pub role: Role,
    pub content: String,
}

/// Provider-agnostic request produced by the conversation manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderRequest {
    pub system_instruction: String,
    /// Compact description of the live scene
    pub scene_summary: String,
    /// Alternating turns, starting with the user
    pub turns: Vec<RequestTurn>,
}

impl ProviderRequest {
    /// Instructions plus the scene summary, as sent in the system slot.
    pub fn system_prompt(&self) -> String {
        format!("{}\n\nCurrent scene elements:\n{}", self.system_instruction, self.scene_summary)
    }
}

/// Token accounting reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Completion text returned verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderResponse {
    pub text: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl ProviderResponse {
    pub fn new(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self { text: text.into(), model: model.into(), usage: None }
    }
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Run one completion. Bounded by the configured timeout and aborted when
    /// `cancel` fires. Never retries.
    async fn complete(
        &self,
        request: &ProviderRequest,
        cancel: &CancellationToken,
    ) -> Result<ProviderResponse, ProviderError>;
}

/// The configured backend.
#[derive(Debug, Clone)]
pub enum ProviderAdapter {
    Gemini(GeminiProvider),
    OpenAiCompatible(OpenAiCompatibleProvider),
}

impl ProviderAdapter {
    /// Build the adapter for the active provider. Credentials are checked per call.
    pub fn from_config(config: &LlmConfig) -> Result<Self, ProviderError> {
        let provider_name = config.provider.display_name();
        let client = build_http_client(config.timeout_secs)
            .map_err(|e| ProviderError::network(provider_name, e))?;

        Ok(match config.provider {
            ProviderKind::Gemini => {
                Self::Gemini(GeminiProvider::new(client, config.gemini.clone(), config.timeout_secs))
            },
            ProviderKind::OpenAiCompatible => Self::OpenAiCompatible(OpenAiCompatibleProvider::new(
                client,
                config.openai.clone(),
                config.timeout_secs,
            )),
        })
    }

    pub const fn kind(&self) -> ProviderKind {
        match self {
            Self::Gemini(_) => ProviderKind::Gemini,
            Self::OpenAiCompatible(_) => ProviderKind::OpenAiCompatible,
        }
    }
}

#[async_trait]
impl ChatProvider for ProviderAdapter {
    fn name(&self) -> &'static str {
        self.kind().display_name()
    }

    async fn complete(
        &self,
        request: &ProviderRequest,
        cancel: &CancellationToken,
    ) -> Result<ProviderResponse, ProviderError> {
        match self {
            Self::Gemini(provider) => provider.complete(request, cancel).await,
            Self::OpenAiCompatible(provider) => provider.complete(request, cancel).await,
        }
    }
}

/// Race a provider call against its timeout and the cancellation token.
pub(crate) async fn bounded<T, F>(
    provider: &str,
    timeout_secs: u64,
    cancel: &CancellationToken,
    call: F,
) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ProviderError::Cancelled),
        result = tokio::time::timeout(Duration::from_secs(timeout_secs), call) => match result {
            Ok(inner) => inner,
            Err(_) => Err(ProviderError::Timeout {
                provider: provider.to_string(),
                duration_secs: timeout_secs,
            }),
        },
    }
}

/// Map a transport error, keeping reqwest's own timeouts as `Timeout`.
pub(crate) fn transport_error(provider: &str, timeout_secs: u64, err: &reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout { provider: provider.to_string(), duration_secs: timeout_secs }
    } else {
        ProviderError::network(provider, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_times_out() {
        tokio::time::pause();
        let cancel = CancellationToken::new();
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, ProviderError>(())
        };

        let err = bounded("Gemini", 30, &cancel, slow).await.unwrap_err();
        assert_eq!(err, ProviderError::Timeout { provider: "Gemini".into(), duration_secs: 30 });
    }

    #[tokio::test]
    async fn test_bounded_prefers_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = bounded("Gemini", 30, &cancel, async { Ok::<_, ProviderError>(1) }).await;
        assert_eq!(result, Err(ProviderError::Cancelled));
    }

    #[tokio::test]
    async fn test_bounded_passes_through() {
        let cancel = CancellationToken::new();
        let result = bounded("Gemini", 30, &cancel, async { Ok::<_, ProviderError>(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[test]
    fn test_adapter_follows_active_provider() {
        let mut config = LlmConfig::default();
        let adapter = ProviderAdapter::from_config(&config).unwrap();
        assert_eq!(adapter.kind(), ProviderKind::Gemini);
        assert_eq!(adapter.name(), "Gemini");

        config.switch_to(ProviderKind::OpenAiCompatible);
        let adapter = ProviderAdapter::from_config(&config).unwrap();
        assert_eq!(adapter.name(), "OpenAI-compatible");
    }

    #[test]
    fn test_system_prompt_appends_scene() {
        let request = ProviderRequest {
            system_instruction: "rules".into(),
            scene_summary: "(the canvas is empty)".into(),
            turns: Vec::new(),
        };
        assert_eq!(request.system_prompt(), "rules\n\nCurrent scene elements:\n(the canvas is empty)");
    }
}

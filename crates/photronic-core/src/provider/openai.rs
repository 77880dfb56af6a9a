//! OpenAI ChatCompletions-compatible adapter (OpenAI, OpenRouter, local gateways).

use async_trait::async_trait;
use photronic_types::models::OpenAiCompatibleConfig;
use photronic_types::protocol::openai::{
    ChatCompletionRequest, ChatCompletionResponse, OpenAIMessage, OpenAIRole,
};
use photronic_types::{ProviderError, Role};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{bounded, transport_error, ChatProvider, ProviderRequest, ProviderResponse, TokenUsage};

const NAME: &str = "OpenAI-compatible";

#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    config: OpenAiCompatibleConfig,
    timeout_secs: u64,
}

impl OpenAiCompatibleProvider {
    pub fn new(client: reqwest::Client, config: OpenAiCompatibleConfig, timeout_secs: u64) -> Self {
        Self { client, config, timeout_secs }
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim().trim_end_matches('/'))
    }

    pub fn build_body(&self, request: &ProviderRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.turns.len() + 1);
        messages.push(OpenAIMessage::new(OpenAIRole::System, request.system_prompt()));
        for turn in &request.turns {
            let role = match turn.role {
                Role::User => OpenAIRole::User,
                Role::Model => OpenAIRole::Assistant,
            };
            messages.push(OpenAIMessage::new(role, turn.content.as_str()));
        }

        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: None,
            max_tokens: None,
            stream: Some(false),
        }
    }

    fn check_credentials(&self) -> Result<(), ProviderError> {
        let missing = if self.config.api_key.trim().is_empty() {
            Some("API key")
        } else if self.config.endpoint.trim().is_empty() {
            Some("endpoint")
        } else {
            None
        };
        match missing {
            Some(field) => Err(ProviderError::MissingCredential {
                provider: NAME.to_string(),
                field: field.to_string(),
            }),
            None => Ok(()),
        }
    }

    async fn send(&self, body: &ChatCompletionRequest) -> Result<ProviderResponse, ProviderError> {
        let response = self
            .client
            .post(self.url())
            .bearer_auth(self.config.api_key.trim())
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(NAME, self.timeout_secs, &e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::http(NAME, status.as_u16(), &text));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::network(NAME, format!("invalid response body: {}", e)))?;

        let text = parsed.first_content().map(str::to_string).ok_or_else(|| {
            ProviderError::Unavailable {
                provider: NAME.to_string(),
                status: Some(status.as_u16()),
                message: "empty response (no choices)".to_string(),
            }
        })?;

        let usage = parsed.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        let model = parsed.model.unwrap_or_else(|| self.config.model.clone());
        Ok(ProviderResponse { text, model, usage })
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn complete(
        &self,
        request: &ProviderRequest,
        cancel: &CancellationToken,
    ) -> Result<ProviderResponse, ProviderError> {
        self.check_credentials()?;

        let body = self.build_body(request);
        debug!("OpenAI-compatible request: url={} model={}", self.url(), body.model);

        let response = bounded(NAME, self.timeout_secs, cancel, self.send(&body)).await?;
        if let Some(usage) = response.usage {
            info!(
                "OpenAI-compatible usage: prompt={} completion={} total={}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
        Ok(response)
    }
}

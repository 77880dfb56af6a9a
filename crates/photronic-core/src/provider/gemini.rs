//! Google Gemini `generateContent` adapter.

use async_trait::async_trait;
use photronic_types::models::GeminiConfig;
use photronic_types::protocol::gemini::{
    GeminiContent, GeminiRole, GenerateContentRequest, GenerateContentResponse,
};
use photronic_types::{ProviderError, Role};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{bounded, transport_error, ChatProvider, ProviderRequest, ProviderResponse, TokenUsage};

const NAME: &str = "Gemini";

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: reqwest::Client,
    config: GeminiConfig,
    timeout_secs: u64,
}

impl GeminiProvider {
    pub fn new(client: reqwest::Client, config: GeminiConfig, timeout_secs: u64) -> Self {
        Self { client, config, timeout_secs }
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Map the provider-agnostic request onto the Gemini wire format.
    pub fn build_body(request: &ProviderRequest) -> GenerateContentRequest {
        let contents = request
            .turns
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    Role::User => GeminiRole::User,
                    Role::Model => GeminiRole::Model,
                };
                GeminiContent::text(Some(role), turn.content.as_str())
            })
            .collect();

        GenerateContentRequest {
            contents,
            system_instruction: Some(GeminiContent::text(None, request.system_prompt())),
            generation_config: None,
        }
    }

    async fn send(&self, body: &GenerateContentRequest) -> Result<ProviderResponse, ProviderError> {
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.config.api_key.trim())
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(NAME, self.timeout_secs, &e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::http(NAME, status.as_u16(), &text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::network(NAME, format!("invalid response body: {}", e)))?;

        let Some(text) = parsed.first_text() else {
            let reason = parsed
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .or_else(|| parsed.candidates.first().and_then(|c| c.finish_reason.clone()))
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(ProviderError::Unavailable {
                provider: NAME.to_string(),
                status: Some(status.as_u16()),
                message: format!("empty response ({})", reason),
            });
        };

        let usage = parsed.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });
        Ok(ProviderResponse { text, model: self.config.model.clone(), usage })
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn complete(
        &self,
        request: &ProviderRequest,
        cancel: &CancellationToken,
    ) -> Result<ProviderResponse, ProviderError> {
        if self.config.api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredential {
                provider: NAME.to_string(),
                field: "API key".to_string(),
            });
        }

        let body = Self::build_body(request);
        debug!("Gemini request: model={} turns={}", self.config.model, body.contents.len());

        let response = bounded(NAME, self.timeout_secs, cancel, self.send(&body)).await?;
        if let Some(usage) = response.usage {
            info!(
                "Gemini usage: prompt={} completion={} total={}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::RequestTurn;

    #[test]
    fn test_body_maps_roles_and_system_prompt() {
        let request = ProviderRequest {
            system_instruction: "rules".into(),
            scene_summary: "(the canvas is empty)".into(),
            turns: vec![
                RequestTurn { role: Role::User, content: "hi".into() },
                RequestTurn { role: Role::Model, content: "hello".into() },
                RequestTurn { role: Role::User, content: "add a box".into() },
            ],
        };

        let json = serde_json::to_value(GeminiProvider::build_body(&request)).unwrap();
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][2]["parts"][0]["text"], "add a box");
        assert!(json["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .is_some_and(|t| t.starts_with("rules") && t.contains("canvas is empty")));
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let config = GeminiConfig { base_url: "http://localhost:9/".into(), ..GeminiConfig::default() };
        let provider = GeminiProvider::new(reqwest::Client::new(), config, 30);
        assert_eq!(provider.url(), "http://localhost:9/v1beta/models/gemini-2.5-flash:generateContent");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let provider = GeminiProvider::new(reqwest::Client::new(), GeminiConfig::default(), 30);
        let request = ProviderRequest {
            system_instruction: String::new(),
            scene_summary: String::new(),
            turns: Vec::new(),
        };
        let err = provider.complete(&request, &CancellationToken::new()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Gemini API key is not set. Please configure it in the settings."
        );
    }
}

//! LLM provider configuration.

use serde::{Deserialize, Serialize};

use super::enums::ProviderKind;

/// Default request bound for provider calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Google Gemini settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    /// API root; overridable for testing and regional endpoints
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
        }
    }
}

/// OpenAI ChatCompletions-compatible settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenAiCompatibleConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
}

fn default_openai_endpoint() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

impl Default for OpenAiCompatibleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_openai_endpoint(),
            model: default_openai_model(),
        }
    }
}

/// Provider selection plus the stored settings of every provider.
///
/// Switching `provider` never clears the other provider's fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default, alias = "openAI")]
    pub openai: OpenAiCompatibleConfig,
    /// Upper bound for one provider call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            gemini: GeminiConfig::default(),
            openai: OpenAiCompatibleConfig::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Borrowed view of the active provider's settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveProvider<'a> {
    Gemini(&'a GeminiConfig),
    OpenAiCompatible(&'a OpenAiCompatibleConfig),
}

impl LlmConfig {
    /// Settings of the currently selected provider.
    pub const fn active(&self) -> ActiveProvider<'_> {
        match self.provider {
            ProviderKind::Gemini => ActiveProvider::Gemini(&self.gemini),
            ProviderKind::OpenAiCompatible => ActiveProvider::OpenAiCompatible(&self.openai),
        }
    }

    /// Select a different provider, keeping all stored settings.
    pub fn switch_to(&mut self, provider: ProviderKind) {
        self.provider = provider;
    }

    /// Model name of the active provider.
    pub fn active_model(&self) -> &str {
        match self.active() {
            ActiveProvider::Gemini(cfg) => &cfg.model,
            ActiveProvider::OpenAiCompatible(cfg) => &cfg.model,
        }
    }
}

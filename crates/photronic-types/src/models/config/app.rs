//! Application-level configuration.

use serde::{Deserialize, Serialize};

use super::edit::EditConfig;
use super::enums::HistoryWindow;
use super::llm::LlmConfig;
use crate::error::ConfigError;

/// Conversation assembly settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationConfig {
    /// History replayed to the provider on every turn
    #[serde(default)]
    pub history_window: HistoryWindow,
    /// Replaces the built-in edit-plan instructions when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

/// Full application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Provider selection and credentials
    #[serde(default)]
    pub llm: LlmConfig,
    /// Conversation assembly
    #[serde(default)]
    pub conversation: ConversationConfig,
    /// Edit pricing
    #[serde(default)]
    pub edit: EditConfig,
}

impl AppConfig {
    /// Create default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::invalid("llm.timeout_secs", "must be greater than 0"));
        }
        if self.conversation.history_window == HistoryWindow::Last(0) {
            return Err(ConfigError::invalid(
                "conversation.history_window",
                "last:K requires K greater than 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::new());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = AppConfig::new();
        config.conversation.history_window = HistoryWindow::Last(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { field, .. }) if field == "conversation.history_window"
        ));
    }
}

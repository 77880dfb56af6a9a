//! Application config loading, validation, and atomic persistence.

use std::fs;
use std::path::Path;

use photronic_types::models::ProviderKind;
use photronic_types::{AppConfig, ConfigError};
use tracing::{debug, info, warn};

use super::paths::get_config_path;
use crate::error::AppResult;

/// Environment variable holding the Gemini API key.
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
/// Environment variable holding the OpenAI-compatible API key.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable selecting the active provider.
pub const ENV_PROVIDER: &str = "PHOTRONIC_PROVIDER";

/// Load the application config from the data directory, applying environment overrides.
///
/// A missing file yields the default configuration.
pub fn load_config() -> AppResult<AppConfig> {
    let path = get_config_path()?;
    let mut config = load_config_from(&path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config)?;
    Ok(config)
}

/// Save the application config to the data directory.
pub fn save_config(config: &AppConfig) -> AppResult<()> {
    let path = get_config_path()?;
    save_config_to(&path, config)
}

/// Update specific fields in the config.
pub fn update_config<F>(updater: F) -> AppResult<AppConfig>
where
    F: FnOnce(&mut AppConfig),
{
    let path = get_config_path()?;
    let mut config = load_config_from(&path)?;
    updater(&mut config);
    validate_config(&config)?;
    save_config_to(&path, &config)?;
    Ok(config)
}

/// Read a config file. Missing files produce defaults; invalid JSON is an error.
pub fn load_config_from(path: &Path) -> AppResult<AppConfig> {
    if !path.exists() {
        debug!("No config at {}, using defaults", path.display());
        return Ok(AppConfig::new());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::from_json_error(&e))?;
    Ok(config)
}

/// Write a config file atomically (temp file + rename).
pub fn save_config_to(path: &Path, config: &AppConfig) -> AppResult<()> {
    let content = serde_json::to_string_pretty(config)?;
    let temp_path = path.with_extension("json.tmp");

    fs::write(&temp_path, content).map_err(|e| ConfigError::from_io_error(&e))?;
    fs::rename(&temp_path, path).map_err(|e| ConfigError::from_io_error(&e))?;
    info!("Saved config to {}", path.display());
    Ok(())
}

/// Fill credentials and provider selection from the environment.
///
/// Environment values only override empty stored keys, so keys entered in the
/// settings always win.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if config.llm.gemini.api_key.is_empty() {
        if let Some(key) = lookup(ENV_GEMINI_API_KEY).filter(|k| !k.trim().is_empty()) {
            config.llm.gemini.api_key = key.trim().to_string();
        }
    }
    if config.llm.openai.api_key.is_empty() {
        if let Some(key) = lookup(ENV_OPENAI_API_KEY).filter(|k| !k.trim().is_empty()) {
            config.llm.openai.api_key = key.trim().to_string();
        }
    }
    if let Some(raw) = lookup(ENV_PROVIDER) {
        match ProviderKind::from_string(&raw) {
            Some(kind) => config.llm.switch_to(kind),
            None => warn!("Ignoring unknown {}={}", ENV_PROVIDER, raw),
        }
    }
}

/// Validate ranges plus the OpenAI-compatible endpoint URL.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    config.validate()?;

    let endpoint = config.llm.openai.endpoint.trim();
    if !endpoint.is_empty() {
        let parsed = url::Url::parse(endpoint)
            .map_err(|e| ConfigError::invalid("llm.openai.endpoint", e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "llm.openai.endpoint",
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use photronic_types::models::HistoryWindow;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::new());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::new();
        config.llm.switch_to(ProviderKind::OpenAiCompatible);
        config.llm.openai.api_key = "sk-test".to_string();
        config.conversation.history_window = HistoryWindow::Last(6);
        save_config_to(&path, &config).unwrap();

        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, crate::AppError::Config(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_env_overrides_fill_empty_keys_only() {
        let mut config = AppConfig::new();
        config.llm.openai.api_key = "stored".to_string();

        apply_env_overrides(&mut config, |key| match key {
            ENV_GEMINI_API_KEY => Some("env-gemini".to_string()),
            ENV_OPENAI_API_KEY => Some("env-openai".to_string()),
            ENV_PROVIDER => Some("openai".to_string()),
            _ => None,
        });

        assert_eq!(config.llm.gemini.api_key, "env-gemini");
        assert_eq!(config.llm.openai.api_key, "stored");
        assert_eq!(config.llm.provider, ProviderKind::OpenAiCompatible);
    }

    #[test]
    fn test_validate_rejects_non_http_endpoint() {
        let mut config = AppConfig::new();
        config.llm.openai.endpoint = "ftp://example.com".to_string();
        assert!(validate_config(&config).is_err());

        config.llm.openai.endpoint = "not a url".to_string();
        assert!(validate_config(&config).is_err());

        config.llm.openai.endpoint = "http://localhost:11434/v1".to_string();
        assert!(validate_config(&config).is_ok());
    }
}

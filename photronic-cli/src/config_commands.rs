use anyhow::{Context, Result};
use colored::Colorize;

use photronic_core::modules::config as core_config;
use photronic_types::models::{HistoryWindow, ProviderKind};
use photronic_types::AppConfig;

pub fn show_config(json: bool) -> Result<()> {
    let config = core_config::load_config().map_err(|e| anyhow::anyhow!(e))?;
    let config = masked(config);

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let llm = &config.llm;
    println!("{}", "Provider Configuration:".cyan().bold());
    println!("  Active: {}", llm.provider.display_name());
    println!("  Model: {}", llm.active_model());
    println!("  Timeout: {}s", llm.timeout_secs);
    println!("{}", "Gemini:".cyan().bold());
    println!("  API Key: {}", or_unset(&llm.gemini.api_key));
    println!("  Model: {}", llm.gemini.model);
    println!("{}", "OpenAI-compatible:".cyan().bold());
    println!("  Endpoint: {}", llm.openai.endpoint);
    println!("  Model: {}", llm.openai.model);
    println!("  API Key: {}", or_unset(&llm.openai.api_key));
    println!("{}", "Conversation:".cyan().bold());
    println!("  History: {}", config.conversation.history_window);
    println!(
        "  System prompt: {}",
        if config.conversation.system_prompt.is_some() { "custom" } else { "default" }
    );
    let costs = &config.edit.costs;
    println!("{}", "Credits per operation:".cyan().bold());
    println!("  add {} / modify {} / delete {}", costs.add, costs.modify, costs.delete);
    Ok(())
}

pub fn set_provider(name: &str) -> Result<()> {
    let provider = ProviderKind::from_string(name)
        .with_context(|| format!("Unknown provider: {} (expected 'gemini' or 'openai')", name))?;

    core_config::update_config(|config| config.llm.switch_to(provider))
        .map_err(|e| anyhow::anyhow!(e))?;

    println!("{} Active provider: {}", "✓".green(), provider.display_name());
    Ok(())
}

pub fn set_gemini_key(key: &str) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    core_config::update_config(|config| config.llm.gemini.api_key = key.to_string())
        .map_err(|e| anyhow::anyhow!(e))?;

    println!("{} Gemini API key saved ({})", "✓".green(), mask_key(key));
    Ok(())
}

pub fn set_openai(endpoint: Option<String>, model: Option<String>, key: Option<String>) -> Result<()> {
    if endpoint.is_none() && model.is_none() && key.is_none() {
        anyhow::bail!("Specify at least one of --endpoint, --model or --key");
    }

    let config = core_config::update_config(|config| {
        let openai = &mut config.llm.openai;
        if let Some(endpoint) = endpoint {
            openai.endpoint = endpoint.trim().trim_end_matches('/').to_string();
        }
        if let Some(model) = model {
            openai.model = model.trim().to_string();
        }
        if let Some(key) = key {
            openai.api_key = key.trim().to_string();
        }
    })
    .map_err(|e| anyhow::anyhow!(e))?;

    let openai = &config.llm.openai;
    println!(
        "{} OpenAI-compatible: {} ({}), key {}",
        "✓".green(),
        openai.endpoint,
        openai.model,
        or_unset(&mask_key(&openai.api_key))
    );
    Ok(())
}

pub fn set_history_window(window: &str) -> Result<()> {
    let window = HistoryWindow::from_string(window)
        .with_context(|| format!("Invalid history window: {} (expected 'all' or 'last:K')", window))?;

    core_config::update_config(|config| config.conversation.history_window = window)
        .map_err(|e| anyhow::anyhow!(e))?;

    println!("{} History window: {}", "✓".green(), window);
    Ok(())
}

fn masked(mut config: AppConfig) -> AppConfig {
    config.llm.gemini.api_key = mask_key(&config.llm.gemini.api_key);
    config.llm.openai.api_key = mask_key(&config.llm.openai.api_key);
    config
}

fn or_unset(value: &str) -> String {
    if value.is_empty() {
        "(not set)".dimmed().to_string()
    } else {
        value.to_string()
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};

use photronic_types::models::CREDIT_PACKAGES;

use crate::cli::ConfigCommands;
use crate::config_commands;

pub fn handle_config_command(cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show { json } => config_commands::show_config(json),
        ConfigCommands::Provider { name } => config_commands::set_provider(&name),
        ConfigCommands::GeminiKey { key } => config_commands::set_gemini_key(&key),
        ConfigCommands::Openai { endpoint, model, key } => {
            config_commands::set_openai(endpoint, model, key)
        },
        ConfigCommands::History { window } => config_commands::set_history_window(&window),
    }
}

pub fn handle_packages(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&CREDIT_PACKAGES)?);
        return Ok(());
    }

    println!("{table}", table = packages_table());
    println!("\nBuy inside a chat session with {}", "/buy <credits>".cyan());
    Ok(())
}

pub fn packages_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Credits", "Price", ""]);

    for pkg in &CREDIT_PACKAGES {
        let badge = if pkg.popular {
            Cell::new("Most popular").fg(Color::Green)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            Cell::new(pkg.credits),
            Cell::new(format!("${:.2}", pkg.price)),
            badge,
        ]);
    }
    table
}

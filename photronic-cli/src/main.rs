//! Photronic CLI
//!
//! Terminal front-end for the scene edit pipeline:
//! - `chat` runs an interactive session against the configured provider
//! - `config` reads and writes `~/.photronic/config.json`
//! - `packages` lists the credit packages

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod chat;
mod cli;
mod commands;
mod config_commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match cli.command {
        Some(Commands::Chat { name, credits }) => chat::run(&name, credits).await,
        Some(Commands::Config(cmd)) => commands::handle_config_command(cmd),
        Some(Commands::Packages { json }) => commands::handle_packages(json),
        None => chat::run("Guest", 5).await,
    }
}

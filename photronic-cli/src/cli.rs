use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "photronic",
    about = "Photronic - chat-driven scene editor",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start an interactive editing session (default if no command specified)")]
    Chat {
        #[arg(short, long, default_value = "Guest", help = "Account display name")]
        name: String,

        #[arg(short, long, default_value = "5", help = "Starting credit balance")]
        credits: u64,
    },

    #[command(subcommand, about = "View and modify configuration")]
    Config(ConfigCommands),

    #[command(about = "List credit packages")]
    Packages {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show current configuration")]
    Show {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Select the active provider")]
    Provider {
        #[arg(help = "Provider name ('gemini' or 'openai')")]
        name: String,
    },

    #[command(about = "Set the Gemini API key")]
    GeminiKey {
        #[arg(help = "API key")]
        key: String,
    },

    #[command(about = "Configure the OpenAI-compatible provider")]
    Openai {
        #[arg(long, help = "Base URL, e.g. https://openrouter.ai/api/v1")]
        endpoint: Option<String>,

        #[arg(long, help = "Model name")]
        model: Option<String>,

        #[arg(long, help = "API key")]
        key: Option<String>,
    },

    #[command(about = "Set how much history is sent ('all' or 'last:K')")]
    History {
        #[arg(help = "History window")]
        window: String,
    },
}

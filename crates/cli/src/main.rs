//! Daybook CLI — the main entry point.
//!
//! Commands:
//! - `run`    — Start the bot: channel pump + orchestrator
//! - `chat`   — Send one message to the agent locally
//! - `config` — Initialize or inspect the configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "daybook",
    about = "Daybook — a single-user conversational calendar agent",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot and listen for messages
    Run,

    /// Send a single message to the agent locally
    Chat {
        /// The message text
        message: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default config file if none exists
    Init,
    /// Print the active configuration (secrets redacted)
    Show,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run => commands::run::run().await?,
        Commands::Chat { message } => commands::chat::run(&message).await?,
        Commands::Config { action } => match action {
            ConfigAction::Init => commands::config_cmd::init()?,
            ConfigAction::Show => commands::config_cmd::show()?,
        },
    }

    Ok(())
}

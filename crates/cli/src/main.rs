//! Storewise CLI, the main entry point.
//!
//! Commands:
//! - `chat`    Interactive console session
//! - `ask`     Answer a single query and exit
//! - `serve`   Start the web chat and HTTP API
//! - `doctor`  Report missing configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "storewise",
    about = "Storewise: retail insights from your stores and your market",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the configuration file (default: ./storewise.toml)
    #[arg(short, long, global = true, env = "STOREWISE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant in the terminal
    Chat,

    /// Ask a single question
    Ask {
        /// The question to answer
        #[arg(short, long)]
        query: String,
    },

    /// Start the web chat and HTTP API
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check which configuration keys are missing
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Chat => commands::chat::run(config).await?,
        Commands::Ask { query } => commands::ask::run(config, &query).await?,
        Commands::Serve { port } => commands::serve::run(config, port).await?,
        Commands::Doctor => commands::doctor::run(config).await?,
    }

    Ok(())
}

//! TfPilot CLI: the main entry point.
//!
//! Commands:
//! - `ask`: Answer one question, or generate files into a workspace
//! - `chat`: Interactive session over stdin
//! - `history`: Show recent conversation turns for a workspace
//! - `onboard`: Write the default config file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "tfpilot",
    about = "TfPilot: a Terraform assistant for your terminal",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.tfpilot/config.toml
    #[arg(short, long, global = true, env = "TFPILOT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question
    Ask {
        /// The message to send
        message: String,

        /// Terraform workspace to read, and to write generated files into
        #[arg(short, long)]
        workspace: Option<PathBuf>,
    },

    /// Start an interactive session
    Chat {
        /// Terraform workspace to read, and to write generated files into
        #[arg(short, long)]
        workspace: Option<PathBuf>,
    },

    /// Show recent conversation turns
    History {
        /// Workspace whose history to show (omit for queries without one)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Number of turns to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Initialize configuration
    Onboard,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing. Logs go to stderr so replies on stdout stay clean.
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Ask { message, workspace } => {
            commands::ask::run(config_path, &message, workspace).await?
        }
        Commands::Chat { workspace } => commands::chat::run(config_path, workspace).await?,
        Commands::History { workspace, limit } => {
            commands::history::run(config_path, workspace, limit).await?
        }
        Commands::Onboard => commands::onboard::run(config_path).await?,
    }

    Ok(())
}

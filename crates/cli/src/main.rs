//! memoclaw CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Write a starter config file
//! - `chat`    — Interactive chat or single-message mode
//! - `doctor`  — Diagnose configuration and memory health

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "memoclaw",
    about = "memoclaw — a conversational assistant with layered memory",
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
    /// Write a starter configuration file
    Onboard,

    /// Chat with the assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Session id (defaults to a fresh one per run)
        #[arg(short, long)]
        session: Option<String>,

        /// User id (defaults to "local")
        #[arg(short, long, default_value = "local")]
        user: String,
    },

    /// Diagnose configuration and memory health
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
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
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat {
            message,
            session,
            user,
        } => commands::chat::run(message, session, user).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}

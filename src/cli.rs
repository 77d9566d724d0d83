//! CLI argument parsing with subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Raspi Surveillance Telegram bot.
///
/// Answers /start, /help and echoes text; lines typed on the console are
/// relayed to the configured chat.
#[derive(Parser)]
#[command(name = "raspi-surveillance-bot")]
#[command(about = "Raspi Surveillance Telegram bot with an operator console")]
#[command(version)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Poll for updates and relay console input to the configured chat (default)
    Run,

    /// Poll for updates until SIGINT/SIGTERM, without the console
    Serve,

    /// Send a single message to the configured chat and exit
    Send {
        /// Message to send
        message: String,
    },

    /// Show current configuration status
    Status,
}

//! Raspi Surveillance Bot - CLI entry point.
//!
//! Provides subcommands for running the bot with or without the operator
//! console, one-shot sends, and a configuration check.

use anyhow::{Context, Result};
use clap::Parser;
use raspi_surveillance_bot::bot::{self, Mode};
use raspi_surveillance_bot::cli::{Cli, Commands};
use raspi_surveillance_bot::{Config, Messenger, TelegramMessenger};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        // Both bot modes exit 0 even when startup fails.
        Commands::Run => bot::run(cli.config, Mode::Console).await,
        Commands::Serve => bot::run(cli.config, Mode::Idle).await,
        Commands::Send { message } => {
            send_once(cli.config, &message)
                .await
                .context("Failed to send message")?;
        }
        Commands::Status => {
            print_status(cli.config);
        }
    }

    Ok(())
}

/// Send one message to the configured chat.
async fn send_once(config_path: Option<PathBuf>, message: &str) -> Result<()> {
    let config = Config::load(config_path)?;
    let messenger = TelegramMessenger::new(&config.bot_token);
    messenger.send_text(config.chat_id, message).await?;
    println!("✅ Sent to chat {}", config.chat_id);
    Ok(())
}

/// Print configuration status.
fn print_status(config_path: Option<PathBuf>) {
    println!("📊 Raspi Surveillance Bot Status\n");

    match Config::load(config_path) {
        Ok(config) => {
            println!("✅ Configuration: Found");
            println!("   Chat ID: {}", config.chat_id);
            println!("   Idle interval: {}s", config.idle_interval.as_secs());
            println!("   Poll timeout: {}s", config.poll_timeout.as_secs());
        }
        Err(e) => {
            println!("❌ Configuration: Not found or invalid");
            println!("   Error: {}", e);
            println!();
            println!("Create config at ~/.raspi-bot/config.json:");
            println!(r#"  {{"bot_token": "...", "chat_id": "..."}}"#);
            println!("or set TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID.");
        }
    }
}

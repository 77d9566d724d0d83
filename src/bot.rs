//! Long-running Telegram bot: handler registration, polling and teardown.

use crate::config::Config;
use crate::console::{self, Console};
use crate::error::{HandlerError, StartupError};
use crate::handlers::{self, DispatchErrorLogger};
use crate::lifecycle::{Lifecycle, PollingService};
use crate::messenger::{Messenger, TelegramMessenger};
use crate::routing::{Command, InboundUpdate};
use crate::shutdown;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use teloxide::dispatching::{ShutdownToken, UpdateHandler};
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::types::Me;
use teloxide::update_listeners::Polling;
use teloxide::utils::command::BotCommands;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// What the main task does while the bot polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Relay stdin lines to the configured chat.
    Console,
    /// Wait for SIGINT/SIGTERM.
    Idle,
}

/// Route text messages and channel posts to the handlers.
pub fn schema() -> UpdateHandler<HandlerError> {
    fn routed(entry: UpdateHandler<HandlerError>) -> UpdateHandler<HandlerError> {
        entry
            .filter_map(|msg: Message, me: Me| InboundUpdate::from_message(&msg, me.username()))
            .endpoint(handlers::dispatch)
    }

    dptree::entry()
        .branch(routed(Update::filter_message()))
        .branch(routed(Update::filter_channel_post()))
}

/// The dispatcher running in a background task.
pub struct TelegramPolling {
    shutdown: ShutdownToken,
    task: Option<JoinHandle<()>>,
    dispatch_stopped: bool,
}

#[async_trait]
impl PollingService for TelegramPolling {
    async fn stop_dispatch(&mut self) {
        match self.shutdown.shutdown() {
            Ok(done) => {
                done.await;
                self.dispatch_stopped = true;
            }
            Err(_) => tracing::debug!("Dispatcher was not running"),
        }
    }

    async fn stop_client(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };

        if !self.dispatch_stopped {
            task.abort();
        }

        if let Err(e) = task.await {
            if !e.is_cancelled() {
                tracing::warn!("Polling task ended abnormally: {}", e);
            }
        }
    }
}

/// Register handlers and start long-polling in a background task.
pub fn start_polling(messenger: &TelegramMessenger, config: &Config) -> TelegramPolling {
    tracing::info!("Registering handlers");

    let bot = messenger.bot().clone();
    let shared: Arc<dyn Messenger> = Arc::new(messenger.clone());

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![shared])
        .default_handler(|upd| async move {
            tracing::debug!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(DispatchErrorLogger::new())
        .build();

    let shutdown = dispatcher.shutdown_token();
    let listener = Polling::builder(bot).timeout(config.poll_timeout).build();

    tracing::info!("Starting polling");
    let task = tokio::spawn(async move {
        dispatcher
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error from the update listener"),
            )
            .await;
    });

    TelegramPolling {
        shutdown,
        task: Some(task),
        dispatch_stopped: false,
    }
}

/// Advertise the command list to Telegram clients.
async fn register_commands(bot: &Bot) {
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        tracing::warn!("Failed to register bot commands: {}", e);
    }
}

/// Run the bot until shutdown.
///
/// Startup failures are logged and swallowed: the process exits normally.
pub async fn run(config_path: Option<PathBuf>, mode: Mode) {
    let shutdown_token = CancellationToken::new();
    let listener = shutdown::listen_for_signals(shutdown_token.clone());
    let mut lifecycle = Lifecycle::new();

    match start(config_path, &mut lifecycle).await {
        Ok((messenger, config, username)) => {
            tracing::info!("Successfully started.");
            tracing::info!("Bot info: @{}", username);

            match mode {
                Mode::Console => {
                    tracing::info!("Sending messages to chat[ID={}]", config.chat_id);
                    let console = Console {
                        messenger: &messenger,
                        chat_id: config.chat_id,
                        prompt: console::prompt_for(&username, config.chat_id),
                        idle_interval: config.idle_interval,
                    };
                    let exit = console
                        .run(console::stdin_lines(), tokio::io::stdout(), &shutdown_token)
                        .await;
                    tracing::debug!(?exit, "Console loop finished");
                }
                Mode::Idle => {
                    tracing::info!("Idling until an exit signal arrives...");
                    shutdown_token.cancelled().await;
                }
            }
        }
        Err(e) => {
            tracing::error!("{}", e);
            tracing::error!("Bot is not up. Exiting.");
        }
    }

    lifecycle.stop().await;
    shutdown_token.cancel();
    let _ = listener.await;
    tracing::info!("Exiting");
}

async fn start(
    config_path: Option<PathBuf>,
    lifecycle: &mut Lifecycle<TelegramPolling>,
) -> Result<(TelegramMessenger, Config, String), StartupError> {
    tracing::info!("Initializing");
    let config = Config::load(config_path)?;
    let messenger = TelegramMessenger::new(&config.bot_token);

    // A rejected token surfaces here rather than inside the dispatcher task.
    let username = messenger
        .bot_username()
        .await
        .map_err(StartupError::Identity)?;

    lifecycle.started(start_polling(&messenger, &config));
    register_commands(messenger.bot()).await;

    Ok((messenger, config, username))
}

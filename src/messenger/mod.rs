//! Messenger abstraction layer.
//!
//! Provides a trait over the outbound side of a messaging platform so the
//! handlers and the operator console only depend on "send text to chat C".

pub mod telegram;

use crate::error::MessengerError;
use async_trait::async_trait;
use teloxide::types::ChatId;

pub use telegram::TelegramMessenger;

/// Abstraction over messaging platforms for outbound text.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a plain text message to a chat.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), MessengerError>;

    /// Username of the bot account behind this messenger.
    async fn bot_username(&self) -> Result<String, MessengerError>;

    /// Get the platform name for logging purposes.
    fn platform_name(&self) -> &'static str;
}

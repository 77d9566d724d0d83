//! Telegram messenger implementation.

use super::Messenger;
use crate::error::MessengerError;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ChatId;

/// Telegram messenger backed by a `teloxide` bot client.
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    /// Create a new Telegram messenger.
    pub fn new(bot_token: &str) -> Self {
        Self {
            bot: Bot::new(bot_token),
        }
    }

    /// The underlying bot client, shared with the dispatcher.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), MessengerError> {
        if text.is_empty() {
            return Err(MessengerError::EmptyMessage);
        }

        self.bot.send_message(chat_id, text).await?;
        Ok(())
    }

    async fn bot_username(&self) -> Result<String, MessengerError> {
        let me = self.bot.get_me().await?;
        Ok(me.username().to_string())
    }

    fn platform_name(&self) -> &'static str {
        "Telegram"
    }
}

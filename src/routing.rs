//! Classification of inbound updates into handler routes.
//!
//! Routes are tried in registration order and the first match wins:
//! `/start`, `/help`, plain text, then any other command.

use teloxide::types::{ChatId, Message};
use teloxide::utils::command::BotCommands;

/// Commands advertised to Telegram clients.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Say hello")]
    Start,
    #[command(description = "Show what this bot is")]
    Help,
}

impl Command {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            _ => None,
        }
    }
}

/// Handler an update is routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Start,
    Help,
    Echo(String),
    Unknown,
}

impl Route {
    /// Classify message text.
    ///
    /// Returns `None` for updates without text, which no handler accepts.
    pub fn classify(text: Option<&str>, bot_username: &str) -> Option<Self> {
        let text = text?;

        if !text.starts_with('/') {
            return Some(Route::Echo(text.to_string()));
        }

        let token = text
            .split_whitespace()
            .next()
            .and_then(|token| token.strip_prefix('/'))
            .unwrap_or_default();
        if token.is_empty() {
            return Some(Route::Unknown);
        }

        let (name, mention) = match token.split_once('@') {
            Some((name, mention)) => (name, Some(mention)),
            None => (token, None),
        };

        if let Some(mention) = mention {
            if !mention.eq_ignore_ascii_case(bot_username) {
                return Some(Route::Unknown);
            }
        }

        Some(match Command::from_name(name) {
            Some(Command::Start) => Route::Start,
            Some(Command::Help) => Route::Help,
            None => Route::Unknown,
        })
    }

    /// Name of the handler serving this route.
    pub fn handler_name(&self) -> &'static str {
        match self {
            Route::Start => "start",
            Route::Help => "help",
            Route::Echo(_) => "echo",
            Route::Unknown => "unknown",
        }
    }
}

/// The dispatcher's view of an update: where it came from and where it goes.
#[derive(Debug, Clone)]
pub struct InboundUpdate {
    pub chat_id: ChatId,
    pub route: Route,
}

impl InboundUpdate {
    /// Build from a Telegram message; `None` if no handler accepts it.
    pub fn from_message(msg: &Message, bot_username: &str) -> Option<Self> {
        Route::classify(msg.text(), bot_username).map(|route| Self {
            chat_id: msg.chat.id,
            route,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Option<Route> {
        Route::classify(Some(text), "raspi_bot")
    }

    #[test]
    fn test_known_commands() {
        assert_eq!(classify("/start"), Some(Route::Start));
        assert_eq!(classify("/help"), Some(Route::Help));
        assert_eq!(classify("/START"), Some(Route::Start));
    }

    #[test]
    fn test_command_arguments_are_ignored() {
        assert_eq!(classify("/start now please"), Some(Route::Start));
    }

    #[test]
    fn test_mentions() {
        assert_eq!(classify("/help@raspi_bot"), Some(Route::Help));
        assert_eq!(classify("/help@Raspi_Bot"), Some(Route::Help));
        assert_eq!(classify("/help@other_bot"), Some(Route::Unknown));
    }

    #[test]
    fn test_plain_text_is_echoed_verbatim() {
        assert_eq!(classify("hello"), Some(Route::Echo("hello".to_string())));
        assert_eq!(
            classify("  spaced /start text "),
            Some(Route::Echo("  spaced /start text ".to_string()))
        );
    }

    #[test]
    fn test_unrecognized_commands() {
        assert_eq!(classify("/foo"), Some(Route::Unknown));
        assert_eq!(classify("/"), Some(Route::Unknown));
        assert_eq!(classify("/starting"), Some(Route::Unknown));
        assert_eq!(classify("/ start"), Some(Route::Unknown));
        assert_eq!(classify("/\thelp"), Some(Route::Unknown));
        assert_eq!(classify("/@raspi_bot"), Some(Route::Unknown));
    }

    #[test]
    fn test_no_text_matches_nothing() {
        assert_eq!(Route::classify(None, "raspi_bot"), None);
    }

    #[test]
    fn test_handler_names() {
        assert_eq!(Route::Start.handler_name(), "start");
        assert_eq!(Route::Echo(String::new()).handler_name(), "echo");
        assert_eq!(Route::Unknown.handler_name(), "unknown");
    }

    #[test]
    fn test_advertised_commands() {
        let commands = Command::bot_commands();
        let names: Vec<_> = commands
            .iter()
            .map(|c| c.command.trim_start_matches('/'))
            .collect();
        assert_eq!(names, vec!["start", "help"]);
    }
}

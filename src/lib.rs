//! Raspi Surveillance Bot library.
//!
//! Routes Telegram updates to the start/help/echo/unknown handlers and relays
//! operator console input to a fixed chat.

pub mod bot;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod messenger;
pub mod routing;
pub mod shutdown;

// Re-export commonly used types
pub use config::Config;
pub use messenger::{Messenger, TelegramMessenger};
pub use routing::{InboundUpdate, Route};

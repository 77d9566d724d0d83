//! Error types for the application.

use std::path::PathBuf;
use teloxide::types::ChatId;
use thiserror::Error;

/// Errors related to configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// Errors raised by a messenger while talking to the platform.
#[derive(Error, Debug)]
pub enum MessengerError {
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Refusing to send an empty message")]
    EmptyMessage,

    #[error("Messenger unavailable: {0}")]
    Unavailable(String),
}

/// An update handler failed to deliver its reply.
#[derive(Error, Debug)]
#[error("Update from chat {chat_id} caused error in `{handler}` handler: {source}")]
pub struct HandlerError {
    pub handler: &'static str,
    pub chat_id: ChatId,
    #[source]
    pub source: MessengerError,
}

/// Errors raised while bringing the bot up.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not fetch bot info: {0}")]
    Identity(#[source] MessengerError),
}

//! Configuration management.
//!
//! Configuration is read from `~/.raspi-bot/config.json` (or an explicit path)
//! and falls back to environment variables if no config file exists.

use crate::error::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use teloxide::types::ChatId;

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs_config_dir().join("config.json")
}

/// Get the .raspi-bot config directory path.
fn dirs_config_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".raspi-bot"))
        .unwrap_or_else(|| PathBuf::from(".raspi-bot"))
}

/// JSON configuration file structure.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    bot_token: String,
    chat_id: ChatIdValue,
    #[serde(default = "default_idle_interval_secs")]
    idle_interval_secs: u64,
    #[serde(default = "default_poll_timeout_secs")]
    poll_timeout_secs: u64,
}

/// Chat ID that can be either string or integer in JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ChatIdValue {
    String(String),
    Integer(i64),
}

impl ChatIdValue {
    fn to_chat_id(&self) -> Result<ChatId, ConfigError> {
        match self {
            ChatIdValue::String(s) => parse_chat_id("chat_id", s),
            ChatIdValue::Integer(i) => Ok(ChatId(*i)),
        }
    }
}

fn parse_chat_id(field: &str, raw: &str) -> Result<ChatId, ConfigError> {
    raw.trim()
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: "must be a valid integer".to_string(),
        })
}

fn default_idle_interval_secs() -> u64 {
    1
}

fn default_poll_timeout_secs() -> u64 {
    1
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bot API token
    pub bot_token: String,
    /// Chat that receives operator console messages
    pub chat_id: ChatId,
    /// Sleep between console iterations
    pub idle_interval: Duration,
    /// Long-poll timeout passed to getUpdates
    pub poll_timeout: Duration,
}

impl Config {
    /// Load configuration from JSON file, falling back to environment variables.
    ///
    /// Search order:
    /// 1. Provided config_path (if any)
    /// 2. `~/.raspi-bot/config.json`
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if path.exists() {
                return Self::from_json(&path);
            }
            tracing::warn!(path = %path.display(), "Config file not found, trying defaults");
        }

        let default_path = default_config_path();
        if default_path.exists() {
            return Self::from_json(&default_path);
        }

        Self::from_env()
    }

    /// Load configuration from a JSON file.
    pub fn from_json(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let file: ConfigFile = serde_json::from_str(&content)?;

        if file.bot_token.trim().is_empty() {
            return Err(ConfigError::MissingField("bot_token".to_string()));
        }

        Ok(Self {
            chat_id: file.chat_id.to_chat_id()?,
            bot_token: file.bot_token,
            idle_interval: Duration::from_secs(file.idle_interval_secs),
            poll_timeout: Duration::from_secs(file.poll_timeout_secs),
        })
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Try to load .env file (silently ignore if not found)
        let _ = dotenvy::from_path(dirs_config_dir().join(".env"));

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from a key lookup (environment-style names).
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN".to_string()))?;

        let chat_id = lookup("TELEGRAM_CHAT_ID")
            .ok_or_else(|| ConfigError::MissingEnvVar("TELEGRAM_CHAT_ID".to_string()))
            .and_then(|raw| parse_chat_id("TELEGRAM_CHAT_ID", &raw))?;

        let idle_interval_secs = lookup_secs(&lookup, "BOT_IDLE_INTERVAL_SECS")?
            .unwrap_or_else(default_idle_interval_secs);
        let poll_timeout_secs = lookup_secs(&lookup, "BOT_POLL_TIMEOUT_SECS")?
            .unwrap_or_else(default_poll_timeout_secs);

        Ok(Self {
            bot_token,
            chat_id,
            idle_interval: Duration::from_secs(idle_interval_secs),
            poll_timeout: Duration::from_secs(poll_timeout_secs),
        })
    }
}

fn lookup_secs<F>(lookup: &F, key: &str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                field: key.to_string(),
                reason: "must be a whole number of seconds".to_string(),
            })
        })
        .transpose()
}

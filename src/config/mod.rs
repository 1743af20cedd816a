//! Configuration module for the autodelete bot.
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Bot running mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BotMode {
    #[default]
    Polling,
    Webhook,
}

/// Where chat settings and scheduled deletions are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    #[default]
    MongoDb,
    /// Process-local storage, lost on restart. Useful for local runs.
    Memory,
}

/// Startup configuration failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub bot_mode: BotMode,
    pub webhook_url: Option<String>,
    pub webhook_port: u16,
    pub webhook_secret: Option<String>,

    /// Owner user IDs (comma-separated).
    /// Treated as administrators in every chat.
    pub owner_ids: Vec<u64>,

    // Storage
    pub storage_backend: StorageBackend,
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,

    // Expiry
    /// How often the sweeper looks for due deletions.
    pub sweep_interval: Duration,
    /// How long a scheduled deletion may outlive its deadline before
    /// MongoDB's TTL monitor drops it on its own.
    pub expiry_grace: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token = var("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?;

        let bot_mode = match var("BOT_MODE").map(|m| m.to_lowercase()).as_deref() {
            None | Some("polling") => BotMode::Polling,
            Some("webhook") => BotMode::Webhook,
            Some(other) => {
                return Err(ConfigError::Invalid { name: "BOT_MODE", value: other.to_string() });
            }
        };

        let webhook_url = var("WEBHOOK_URL");
        if bot_mode == BotMode::Webhook && webhook_url.is_none() {
            return Err(ConfigError::Missing("WEBHOOK_URL"));
        }

        let webhook_port = parse_or("WEBHOOK_PORT", var("WEBHOOK_PORT"), 8443)?;

        let owner_ids = var("OWNER_IDS")
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| s.trim().parse::<u64>().ok())
            .collect();

        let storage_backend = match var("STORAGE_BACKEND").map(|b| b.to_lowercase()).as_deref() {
            None | Some("mongodb") | Some("mongo") => StorageBackend::MongoDb,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        let mongodb_uri = var("MONGODB_URI");
        if storage_backend == StorageBackend::MongoDb && mongodb_uri.is_none() {
            return Err(ConfigError::Missing("MONGODB_URI"));
        }

        let sweep_secs: u64 = parse_or("SWEEP_INTERVAL_SECS", var("SWEEP_INTERVAL_SECS"), 60)?;
        if sweep_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "SWEEP_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }
        let grace_secs: u64 = parse_or("EXPIRY_GRACE_SECS", var("EXPIRY_GRACE_SECS"), 86_400)?;

        Ok(Self {
            bot_token,
            bot_mode,
            webhook_url,
            webhook_port,
            webhook_secret: var("WEBHOOK_SECRET"),
            owner_ids,
            storage_backend,
            mongodb_uri,
            mongodb_database: var("MONGODB_DATABASE").unwrap_or_else(|| "telegram_bot".to_string()),
            sweep_interval: Duration::from_secs(sweep_secs),
            expiry_grace: Duration::from_secs(grace_secs),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { name, value }),
    }
}

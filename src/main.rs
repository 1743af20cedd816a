//! autodelete - Telegram auto-delete moderation bot
//!
//! Deletes group messages that contain banned words, filtered media, or
//! that have outlived the chat's deletion timer.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - Settings store and expiry queue (MongoDB or in-memory)
//! - `cache` - Moka-backed caches
//! - `permissions` - Admin checking with caching
//! - `moderation` - Rule evaluator, message processor and expiry sweeper
//! - `plugins` - Bot commands
//! - `bot` - Telegram wiring (with Throttle for API rate limiting)
//! - `events` - Update handlers
//! - `utils` - Argument parsing helpers

mod bot;
mod cache;
mod config;
mod database;
mod error;
mod events;
mod moderation;
mod permissions;
mod plugins;
mod utils;

use std::sync::Arc;

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bot::TelegramMessenger;
use cache::CacheRegistry;
use config::{Config, StorageBackend};
use database::{
    Database, ExpiryQueue, ExpiryRepository, MemoryStore, SettingsRepository, SettingsStore,
};
use moderation::{Moderator, Sweeper};
use permissions::Permissions;
use plugins::Command;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first so RUST_LOG can come from it
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("autodelete=info,teloxide=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting autodelete bot...");

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");
    info!("Bot mode: {:?}, storage: {:?}", config.bot_mode, config.storage_backend);

    let cache = CacheRegistry::new();
    let (settings, queue) = open_storage(&config, &cache).await?;

    // Throttle respects Telegram's rate limits (30 msg/s globally,
    // 1 msg/s per chat, 20 msg/min per group).
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());

    let me = bot.get_me().await?;
    info!("Bot username: @{}", me.username());

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {}", e);
    }

    if config.owner_ids.is_empty() {
        info!("No owner IDs configured (OWNER_IDS is empty)");
    } else {
        info!("Bot owners: {:?}", config.owner_ids);
    }

    // Permissions needs the inner Bot for getChatMember
    let permissions = Permissions::with_owners(bot.inner().clone(), &cache, config.owner_ids.clone());
    let messenger = Arc::new(TelegramMessenger::new(bot.clone(), permissions));
    info!("Caches registered: {}", cache.len());

    match queue.pending().await {
        Ok(n) => info!("{} scheduled deletions pending", n),
        Err(e) => warn!("Could not count pending deletions: {:#}", e),
    }

    let cancel = CancellationToken::new();
    let sweeper = Sweeper::new(queue.clone(), messenger.clone(), config.sweep_interval).spawn(cancel.clone());

    let moderator = Arc::new(Moderator::new(settings, queue, messenger));
    let dispatcher = bot::build_dispatcher(bot.clone(), moderator);

    let result = bot::run(&config, dispatcher, bot).await;

    info!("Shutting down...");
    cancel.cancel();
    if let Err(e) = sweeper.await {
        warn!("Sweeper task ended abnormally: {}", e);
    }

    result
}

/// Open the configured storage backend.
async fn open_storage(
    config: &Config,
    cache: &CacheRegistry,
) -> anyhow::Result<(Arc<dyn SettingsStore>, Arc<dyn ExpiryQueue>)> {
    match config.storage_backend {
        StorageBackend::MongoDb => {
            let uri = config
                .mongodb_uri
                .as_deref()
                .ok_or(config::ConfigError::Missing("MONGODB_URI"))?;

            info!("Connecting to MongoDB...");
            let db = Database::connect(uri, &config.mongodb_database).await?;

            let settings = SettingsRepository::new(&db, cache);
            settings.ensure_indexes().await?;

            let queue = ExpiryRepository::new(&db);
            queue.ensure_indexes(config.expiry_grace).await?;
            info!("Database indexes ready");

            let settings: Arc<dyn SettingsStore> = Arc::new(settings);
            let queue: Arc<dyn ExpiryQueue> = Arc::new(queue);
            Ok((settings, queue))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; settings and pending deletions are lost on restart");
            let store = Arc::new(MemoryStore::new());
            let settings: Arc<dyn SettingsStore> = store.clone();
            let queue: Arc<dyn ExpiryQueue> = store;
            Ok((settings, queue))
        }
    }
}

//! Chat settings repository.
//!
//! Read on every incoming message, so lookups go through a moka cache.
//! Writes are single-document atomic updates and drop the cached copy.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::{IndexOptions, UpdateOptions};
use mongodb::{Collection, IndexModel};
use tracing::debug;

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};
use crate::database::models::ChatSettings;
use crate::database::store::SettingsStore;
use crate::database::Database;

/// MongoDB-backed [`SettingsStore`].
pub struct SettingsRepository {
    collection: Collection<ChatSettings>,
    cache: TypedCache<i64, ChatSettings>,
}

impl SettingsRepository {
    pub fn new(db: &Database, cache: &CacheRegistry) -> Self {
        let settings_cache = cache.get_or_create(
            "chat_settings",
            CacheConfig::with_capacity(10_000).ttl(Duration::from_secs(300)), // 5 mins
        );

        Self {
            collection: db.collection("settings"),
            cache: settings_cache,
        }
    }

    /// Create the unique `chat_id` index.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "chat_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection.create_index(index).await?;
        Ok(())
    }

    fn upsert_options() -> UpdateOptions {
        UpdateOptions::builder().upsert(true).build()
    }
}

#[async_trait]
impl SettingsStore for SettingsRepository {
    async fn get_settings(&self, chat_id: i64) -> Result<ChatSettings> {
        if let Some(settings) = self.cache.get(&chat_id) {
            return Ok(settings);
        }

        let filter = doc! { "chat_id": chat_id };
        let result = self.collection.find_one(filter).await?;
        debug!("DB get settings for {}: {:?}", chat_id, result.is_some());

        let settings = result.unwrap_or_else(|| ChatSettings::new(chat_id));
        self.cache.insert(chat_id, settings.clone());

        Ok(settings)
    }

    async fn ensure_settings(&self, chat_id: i64) -> Result<()> {
        let filter = doc! { "chat_id": chat_id };
        let update = doc! {
            "$setOnInsert": {
                "timer_secs": 0_i64,
                "no_media": false,
                "banned_words": [],
            }
        };

        let result = self
            .collection
            .update_one(filter, update)
            .with_options(Self::upsert_options())
            .await?;

        if result.upserted_id.is_some() {
            debug!("Created default settings for chat {}", chat_id);
            self.cache.invalidate(&chat_id);
        }
        Ok(())
    }

    async fn upsert_timer(&self, chat_id: i64, timer_secs: u32) -> Result<()> {
        let filter = doc! { "chat_id": chat_id };
        let update = doc! { "$set": { "timer_secs": i64::from(timer_secs) } };

        self.collection
            .update_one(filter, update)
            .with_options(Self::upsert_options())
            .await?;

        self.cache.invalidate(&chat_id);
        debug!("Set timer for chat {} to {}s", chat_id, timer_secs);
        Ok(())
    }

    async fn upsert_no_media(&self, chat_id: i64, enabled: bool) -> Result<()> {
        let filter = doc! { "chat_id": chat_id };
        let update = doc! { "$set": { "no_media": enabled } };

        self.collection
            .update_one(filter, update)
            .with_options(Self::upsert_options())
            .await?;

        self.cache.invalidate(&chat_id);
        debug!("Set no_media for chat {} to {}", chat_id, enabled);
        Ok(())
    }

    async fn add_banned_word(&self, chat_id: i64, word: &str) -> Result<bool> {
        if word.is_empty() {
            return Ok(false);
        }

        let filter = doc! { "chat_id": chat_id };
        let update = doc! { "$addToSet": { "banned_words": word } };

        let result = self
            .collection
            .update_one(filter, update)
            .with_options(Self::upsert_options())
            .await?;

        self.cache.invalidate(&chat_id);
        Ok(result.modified_count > 0 || result.upserted_id.is_some())
    }

    async fn remove_banned_word(&self, chat_id: i64, word: &str) -> Result<bool> {
        let filter = doc! { "chat_id": chat_id };
        let update = doc! { "$pull": { "banned_words": word } };

        let result = self.collection.update_one(filter, update).await?;

        self.cache.invalidate(&chat_id);
        Ok(result.modified_count > 0)
    }
}

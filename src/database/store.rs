//! Storage seams used by the moderation core.
//!
//! Both traits are implemented by the MongoDB repositories and by
//! [`MemoryStore`](super::MemoryStore). Components receive them as
//! `Arc<dyn ...>` handles built once in `main`.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::models::{ChatSettings, ScheduledDeletion};

/// Per-chat settings storage. Every write is an atomic upsert.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Settings for a chat, or defaults if none were ever stored.
    async fn get_settings(&self, chat_id: i64) -> Result<ChatSettings>;

    /// Create the default document if the chat has none. Existing values are kept.
    async fn ensure_settings(&self, chat_id: i64) -> Result<()>;

    async fn upsert_timer(&self, chat_id: i64, timer_secs: u32) -> Result<()>;

    async fn upsert_no_media(&self, chat_id: i64, enabled: bool) -> Result<()>;

    /// Add a normalised (lowercase, non-empty) word. Returns `false` if it was already banned.
    async fn add_banned_word(&self, chat_id: i64, word: &str) -> Result<bool>;

    /// Returns `false` if the word was not banned.
    async fn remove_banned_word(&self, chat_id: i64, word: &str) -> Result<bool>;
}

/// Durable queue of messages waiting for their deletion deadline.
#[async_trait]
pub trait ExpiryQueue: Send + Sync {
    /// Insert an entry. Re-enqueueing the same `(chat_id, message_id)` replaces it.
    async fn enqueue(&self, entry: ScheduledDeletion) -> Result<()>;

    /// Remove and return up to `limit` entries with `deadline <= now`,
    /// earliest deadline first. An entry is returned by at most one call.
    async fn take_due(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<ScheduledDeletion>>;

    /// Number of entries still waiting.
    async fn pending(&self) -> Result<u64>;
}

//! Process-local storage.
//!
//! Implements both storage traits without a database. Selected with
//! `STORAGE_BACKEND=memory`; everything is lost when the process exits.

use std::collections::{BTreeSet, HashMap};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;

use super::models::{ChatSettings, ScheduledDeletion};
use super::store::{ExpiryQueue, SettingsStore};

type EntryKey = (i64, i32);

#[derive(Default)]
struct QueueState {
    entries: HashMap<EntryKey, ScheduledDeletion>,
    /// Entries ordered by deadline for range scans.
    by_deadline: BTreeSet<(DateTime<Utc>, EntryKey)>,
}

/// In-memory settings store and expiry queue.
#[derive(Default)]
pub struct MemoryStore {
    settings: DashMap<i64, ChatSettings>,
    queue: Mutex<QueueState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get_settings(&self, chat_id: i64) -> Result<ChatSettings> {
        Ok(self
            .settings
            .get(&chat_id)
            .map(|s| s.value().clone())
            .unwrap_or_else(|| ChatSettings::new(chat_id)))
    }

    async fn ensure_settings(&self, chat_id: i64) -> Result<()> {
        self.settings
            .entry(chat_id)
            .or_insert_with(|| ChatSettings::new(chat_id));
        Ok(())
    }

    async fn upsert_timer(&self, chat_id: i64, timer_secs: u32) -> Result<()> {
        self.settings
            .entry(chat_id)
            .or_insert_with(|| ChatSettings::new(chat_id))
            .timer_secs = timer_secs;
        Ok(())
    }

    async fn upsert_no_media(&self, chat_id: i64, enabled: bool) -> Result<()> {
        self.settings
            .entry(chat_id)
            .or_insert_with(|| ChatSettings::new(chat_id))
            .no_media = enabled;
        Ok(())
    }

    async fn add_banned_word(&self, chat_id: i64, word: &str) -> Result<bool> {
        Ok(self
            .settings
            .entry(chat_id)
            .or_insert_with(|| ChatSettings::new(chat_id))
            .add_banned_word(word))
    }

    async fn remove_banned_word(&self, chat_id: i64, word: &str) -> Result<bool> {
        Ok(self
            .settings
            .get_mut(&chat_id)
            .map(|mut s| s.remove_banned_word(word))
            .unwrap_or(false))
    }
}

#[async_trait]
impl ExpiryQueue for MemoryStore {
    async fn enqueue(&self, entry: ScheduledDeletion) -> Result<()> {
        let mut queue = self.queue.lock();
        let key = entry.key();

        if let Some(previous) = queue.entries.remove(&key) {
            queue.by_deadline.remove(&(previous.deadline, key));
        }
        queue.by_deadline.insert((entry.deadline, key));
        queue.entries.insert(key, entry);
        Ok(())
    }

    async fn take_due(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<ScheduledDeletion>> {
        let mut queue = self.queue.lock();

        let due: Vec<(DateTime<Utc>, EntryKey)> = queue
            .by_deadline
            .iter()
            .take_while(|(deadline, _)| *deadline <= now)
            .take(limit)
            .copied()
            .collect();

        let mut taken = Vec::with_capacity(due.len());
        for slot in due {
            queue.by_deadline.remove(&slot);
            if let Some(entry) = queue.entries.remove(&slot.1) {
                taken.push(entry);
            }
        }
        Ok(taken)
    }

    async fn pending(&self) -> Result<u64> {
        Ok(self.queue.lock().entries.len() as u64)
    }
}

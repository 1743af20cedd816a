//! Test doubles for the messaging and storage seams.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use teloxide::types::{ChatId, MessageId, UserId};

use super::Messenger;
use crate::database::{ChatSettings, ExpiryQueue, ScheduledDeletion, SettingsStore};
use crate::error::ModerationError;

/// Messenger that records every call instead of talking to Telegram.
#[derive(Default)]
pub struct RecordingMessenger {
    admins: Mutex<HashSet<(i64, u64)>>,
    pub deleted: Mutex<Vec<(i64, i32)>>,
    pub sent: Mutex<Vec<(i64, String)>>,
    fail_deletes: AtomicBool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant_admin(&self, chat_id: i64, user_id: u64) {
        self.admins.lock().insert((chat_id, user_id));
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn deleted(&self) -> Vec<(i64, i32)> {
        self.deleted.lock().clone()
    }

    pub fn last_sent(&self) -> Option<String> {
        self.sent.lock().last().map(|(_, text)| text.clone())
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), ModerationError> {
        self.deleted.lock().push((chat_id.0, message_id.0));
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(ModerationError::DeleteFailed {
                chat_id: chat_id.0,
                message_id: message_id.0,
                reason: "message to delete not found".to_string(),
            });
        }
        Ok(())
    }

    async fn is_administrator(&self, chat_id: ChatId, user_id: UserId) -> bool {
        self.admins.lock().contains(&(chat_id.0, user_id.0))
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.sent.lock().push((chat_id.0, text.to_string()));
        Ok(())
    }
}

/// Storage that fails every call, as if MongoDB were unreachable.
pub struct UnavailableStore;

fn unavailable<T>() -> Result<T> {
    Err(anyhow!("connection refused"))
}

#[async_trait]
impl SettingsStore for UnavailableStore {
    async fn get_settings(&self, _chat_id: i64) -> Result<ChatSettings> {
        unavailable()
    }

    async fn ensure_settings(&self, _chat_id: i64) -> Result<()> {
        unavailable()
    }

    async fn upsert_timer(&self, _chat_id: i64, _timer_secs: u32) -> Result<()> {
        unavailable()
    }

    async fn upsert_no_media(&self, _chat_id: i64, _enabled: bool) -> Result<()> {
        unavailable()
    }

    async fn add_banned_word(&self, _chat_id: i64, _word: &str) -> Result<bool> {
        unavailable()
    }

    async fn remove_banned_word(&self, _chat_id: i64, _word: &str) -> Result<bool> {
        unavailable()
    }
}

#[async_trait]
impl ExpiryQueue for UnavailableStore {
    async fn enqueue(&self, _entry: ScheduledDeletion) -> Result<()> {
        unavailable()
    }

    async fn take_due(&self, _now: DateTime<Utc>, _limit: usize) -> Result<Vec<ScheduledDeletion>> {
        unavailable()
    }

    async fn pending(&self) -> Result<u64> {
        unavailable()
    }
}

pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

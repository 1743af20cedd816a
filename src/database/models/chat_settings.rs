//! Per-chat moderation settings.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Moderation settings document, one per chat.
///
/// A chat without a stored document behaves exactly like
/// `ChatSettings::new(chat_id)`: no timer, media allowed, no banned words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSettings {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Telegram chat ID (unique index)
    pub chat_id: i64,

    /// Seconds until a message is deleted (0 = timer disabled)
    #[serde(default)]
    pub timer_secs: u32,

    /// Delete photos, videos and stickers on arrival
    #[serde(default)]
    pub no_media: bool,

    /// Lowercase substrings that trigger immediate deletion
    #[serde(default)]
    pub banned_words: Vec<String>,
}

impl ChatSettings {
    /// Create settings with everything disabled.
    pub fn new(chat_id: i64) -> Self {
        Self {
            id: None,
            chat_id,
            timer_secs: 0,
            no_media: false,
            banned_words: Vec::new(),
        }
    }

    /// Whether no rule is active for this chat.
    pub fn is_inactive(&self) -> bool {
        self.timer_secs == 0 && !self.no_media && self.banned_words.iter().all(|w| w.is_empty())
    }

    /// Add a normalised banned word. Returns `false` if it was already present.
    pub fn add_banned_word(&mut self, word: &str) -> bool {
        if word.is_empty() || self.banned_words.iter().any(|w| w == word) {
            return false;
        }
        self.banned_words.push(word.to_string());
        true
    }

    /// Remove a banned word. Returns `false` if it was not present.
    pub fn remove_banned_word(&mut self, word: &str) -> bool {
        let before = self.banned_words.len();
        self.banned_words.retain(|w| w != word);
        self.banned_words.len() != before
    }
}

//! Rule evaluator.
//!
//! Decides what happens to a message given its chat's settings. Rules are
//! checked in a fixed order and the first match wins:
//!
//! 1. banned word (case-insensitive substring of the text)
//! 2. media filter (photo, video or sticker while `no_media` is on)
//! 3. timer (schedule deletion `timer_secs` from now)
//!
//! Evaluation has no side effects; the caller deletes or enqueues.

use chrono::{DateTime, Duration, Utc};

use super::message::IncomingMessage;
use crate::database::ChatSettings;

/// Why a message is deleted immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteReason {
    BannedWord,
    Media,
}

/// The evaluator's verdict for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    DeleteNow(DeleteReason),
    ScheduleDelete(DateTime<Utc>),
    Allow,
}

/// Evaluate `message` against `settings` at time `now`.
pub fn evaluate(settings: &ChatSettings, message: &IncomingMessage, now: DateTime<Utc>) -> Action {
    if matching_banned_word(&settings.banned_words, &message.text).is_some() {
        return Action::DeleteNow(DeleteReason::BannedWord);
    }

    if settings.no_media && message.attachment.is_some_and(|a| a.is_filtered_media()) {
        return Action::DeleteNow(DeleteReason::Media);
    }

    if settings.timer_secs > 0 {
        return Action::ScheduleDelete(now + Duration::seconds(i64::from(settings.timer_secs)));
    }

    Action::Allow
}

/// First banned word contained in `text`, ignoring case.
///
/// Empty entries are skipped so a malformed list cannot match everything.
pub fn matching_banned_word<'a>(banned_words: &'a [String], text: &str) -> Option<&'a str> {
    if banned_words.is_empty() || text.is_empty() {
        return None;
    }

    let text = text.to_lowercase();
    banned_words
        .iter()
        .filter(|word| !word.is_empty())
        .find(|word| text.contains(word.to_lowercase().as_str()))
        .map(String::as_str)
}

//! Outbound messaging seam.

use async_trait::async_trait;
use teloxide::types::{ChatId, MessageId, UserId};

use crate::error::ModerationError;

/// What the moderation core needs from the chat platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Delete a message. Failures come back as [`ModerationError::DeleteFailed`].
    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId)
        -> Result<(), ModerationError>;

    /// Whether the user administers the chat. Lookup failures count as "no".
    async fn is_administrator(&self, chat_id: ChatId, user_id: UserId) -> bool;

    async fn send_text(&self, chat_id: ChatId, text: &str) -> anyhow::Result<()>;
}

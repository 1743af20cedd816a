//! Telegram-backed [`Messenger`].

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId, UserId};
use tracing::warn;

use super::dispatcher::ThrottledBot;
use crate::error::ModerationError;
use crate::moderation::Messenger;
use crate::permissions::Permissions;

pub struct TelegramMessenger {
    bot: ThrottledBot,
    permissions: Permissions,
}

impl TelegramMessenger {
    pub fn new(bot: ThrottledBot, permissions: Permissions) -> Self {
        Self { bot, permissions }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), ModerationError> {
        self.bot
            .delete_message(chat_id, message_id)
            .await
            .map(|_| ())
            .map_err(|e| ModerationError::DeleteFailed {
                chat_id: chat_id.0,
                message_id: message_id.0,
                reason: e.to_string(),
            })
    }

    async fn is_administrator(&self, chat_id: ChatId, user_id: UserId) -> bool {
        match self.permissions.is_admin(chat_id, user_id).await {
            Ok(is_admin) => is_admin,
            Err(e) => {
                warn!("Admin lookup failed for user {} in chat {}: {}", user_id, chat_id, e);
                false
            }
        }
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> anyhow::Result<()> {
        self.bot.send_message(chat_id, text).await?;
        Ok(())
    }
}

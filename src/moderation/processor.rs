//! Per-message processing.
//!
//! Entry point for every inbound message: commands go to the router,
//! everything else is evaluated against the chat's settings and then
//! deleted, queued for later deletion, or left alone.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::message::IncomingMessage;
use super::messenger::Messenger;
use super::rules::{evaluate, Action, DeleteReason};
use crate::database::{ExpiryQueue, ScheduledDeletion, SettingsStore};
use crate::error::ModerationError;
use crate::plugins::CommandRouter;

/// What happened to a processed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A command of ours was executed (and possibly answered).
    Command,
    /// A command for another bot, or one we don't know.
    Ignored,
    Deleted(DeleteReason),
    Scheduled(DateTime<Utc>),
    Allowed,
}

/// Applies moderation rules to incoming messages.
pub struct Moderator {
    settings: Arc<dyn SettingsStore>,
    queue: Arc<dyn ExpiryQueue>,
    messenger: Arc<dyn Messenger>,
    router: CommandRouter,
}

impl Moderator {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        queue: Arc<dyn ExpiryQueue>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        let router = CommandRouter::new(settings.clone(), messenger.clone());
        Self {
            settings,
            queue,
            messenger,
            router,
        }
    }

    /// Process one inbound message.
    ///
    /// Errors are never fatal: on `StorageUnavailable` the message has been
    /// left untouched, on `DeleteFailed` it simply stays in the chat.
    pub async fn process_incoming_message(
        &self,
        msg: &IncomingMessage,
    ) -> Result<Outcome, ModerationError> {
        self.process_at(msg, Utc::now()).await
    }

    pub async fn process_at(
        &self,
        msg: &IncomingMessage,
        now: DateTime<Utc>,
    ) -> Result<Outcome, ModerationError> {
        if msg.is_command {
            let Some(command) = &msg.command else {
                return Ok(Outcome::Ignored);
            };

            if let Some(reply) = self.router.handle(msg, command).await
                && let Err(e) = self.messenger.send_text(msg.chat_id, &reply).await
            {
                warn!("Failed to answer /{} in chat {}: {}", command.name(), msg.chat_id, e);
            }
            return Ok(Outcome::Command);
        }

        let settings = self
            .settings
            .get_settings(msg.chat_id.0)
            .await
            .map_err(ModerationError::storage)?;

        match evaluate(&settings, msg, now) {
            Action::DeleteNow(reason) => {
                self.messenger.delete_message(msg.chat_id, msg.message_id).await?;
                info!(
                    "Deleted message {} in chat {} ({:?})",
                    msg.message_id.0, msg.chat_id, reason
                );
                Ok(Outcome::Deleted(reason))
            }
            Action::ScheduleDelete(deadline) => {
                let entry =
                    ScheduledDeletion::new(msg.chat_id.0, msg.message_id.0, now, deadline);
                self.queue.enqueue(entry).await.map_err(ModerationError::storage)?;
                debug!(
                    "Message {} in chat {} scheduled for {}",
                    msg.message_id.0, msg.chat_id, deadline
                );
                Ok(Outcome::Scheduled(deadline))
            }
            Action::Allow => Ok(Outcome::Allowed),
        }
    }
}

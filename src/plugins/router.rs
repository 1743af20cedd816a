//! Command router.
//!
//! Executes a parsed [`Command`] against the settings store and returns the
//! reply to send back, if any. Admin commands are gated on the sender being
//! a chat administrator; the check happens before the arguments are parsed.

use std::sync::Arc;

use tracing::{error, info};

use super::help::{HELP_TEXT, START_FAILED_TEXT, WELCOME_TEXT};
use super::Command;
use crate::database::{ChatSettings, SettingsStore};
use crate::error::ModerationError;
use crate::moderation::{IncomingMessage, Messenger};
use crate::utils::parser::{BANWORD_USAGE, UNBANWORD_USAGE};
use crate::utils::{format_duration, normalize_word, parse_timer, parse_toggle, TimerSetting};

pub struct CommandRouter {
    settings: Arc<dyn SettingsStore>,
    messenger: Arc<dyn Messenger>,
}

impl CommandRouter {
    pub fn new(settings: Arc<dyn SettingsStore>, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            settings,
            messenger,
        }
    }

    /// Run `command` and return the text to answer with.
    ///
    /// Usage and permission errors become the reply. Storage errors are
    /// logged and answered only for /start.
    pub async fn handle(&self, msg: &IncomingMessage, command: &Command) -> Option<String> {
        match self.execute(msg, command).await {
            Ok(reply) => Some(reply),
            Err(e @ (ModerationError::Validation(_) | ModerationError::PermissionDenied(_))) => {
                Some(e.to_string())
            }
            Err(e) => {
                error!("/{} failed in chat {}: {}", command.name(), msg.chat_id, e);
                matches!(command, Command::Start(_)).then(|| START_FAILED_TEXT.to_string())
            }
        }
    }

    pub async fn execute(
        &self,
        msg: &IncomingMessage,
        command: &Command,
    ) -> Result<String, ModerationError> {
        if command.is_admin_only() {
            self.require_admin(msg, command).await?;
        }

        let chat_id = msg.chat_id.0;

        match command {
            Command::Start(_) => {
                self.settings
                    .ensure_settings(chat_id)
                    .await
                    .map_err(ModerationError::storage)?;
                info!("Initialized chat {}", chat_id);
                Ok(WELCOME_TEXT.to_string())
            }
            Command::Help => Ok(HELP_TEXT.to_string()),
            Command::Settimer(args) => {
                let timer = parse_timer(args)?;
                self.settings
                    .upsert_timer(chat_id, timer.as_secs())
                    .await
                    .map_err(ModerationError::storage)?;
                info!("Chat {}: timer set to {:?}", chat_id, timer);

                Ok(match timer {
                    TimerSetting::Minutes(m) => format!("Messages will be deleted after {} minutes.", m),
                    TimerSetting::Off => "Timer disabled. Messages will no longer be deleted automatically."
                        .to_string(),
                })
            }
            Command::Banword(args) => {
                let word = normalize_word(args)
                    .ok_or_else(|| ModerationError::Validation(BANWORD_USAGE.to_string()))?;
                let added = self
                    .settings
                    .add_banned_word(chat_id, &word)
                    .await
                    .map_err(ModerationError::storage)?;

                if added {
                    info!("Chat {}: banned word added", chat_id);
                    Ok(format!("Banned word added: {}", word))
                } else {
                    Ok(format!("\"{}\" is already banned.", word))
                }
            }
            Command::Unbanword(args) => {
                let word = normalize_word(args)
                    .ok_or_else(|| ModerationError::Validation(UNBANWORD_USAGE.to_string()))?;
                let removed = self
                    .settings
                    .remove_banned_word(chat_id, &word)
                    .await
                    .map_err(ModerationError::storage)?;

                if removed {
                    info!("Chat {}: banned word removed", chat_id);
                    Ok(format!("Banned word removed: {}", word))
                } else {
                    Ok(format!("\"{}\" is not banned.", word))
                }
            }
            Command::Nomedia(args) => {
                let enabled = parse_toggle(args)?;
                self.settings
                    .upsert_no_media(chat_id, enabled)
                    .await
                    .map_err(ModerationError::storage)?;
                info!("Chat {}: media filter {}", chat_id, if enabled { "on" } else { "off" });

                Ok(if enabled {
                    "Media messages will be deleted.".to_string()
                } else {
                    "Media messages are allowed again.".to_string()
                })
            }
            Command::Settings => {
                let settings = self
                    .settings
                    .get_settings(chat_id)
                    .await
                    .map_err(ModerationError::storage)?;
                Ok(describe(&settings))
            }
        }
    }

    async fn require_admin(
        &self,
        msg: &IncomingMessage,
        command: &Command,
    ) -> Result<(), ModerationError> {
        let denied = ModerationError::PermissionDenied(command.name());
        let Some(user_id) = msg.sender_id else {
            return Err(denied);
        };

        if self.messenger.is_administrator(msg.chat_id, user_id).await {
            Ok(())
        } else {
            Err(denied)
        }
    }
}

const NO_RULES_TEXT: &str = "No moderation rules are active in this chat. Use /help to see how to set them up.";

fn describe(settings: &ChatSettings) -> String {
    if settings.is_inactive() {
        return NO_RULES_TEXT.to_string();
    }

    let timer = if settings.timer_secs > 0 {
        format_duration(settings.timer_secs)
    } else {
        "off".to_string()
    };
    let media = if settings.no_media { "deleted" } else { "allowed" };
    let words = if settings.banned_words.is_empty() {
        "none".to_string()
    } else {
        settings.banned_words.join(", ")
    };

    format!(
        "Settings for this chat:\n- Timer: {}\n- Media: {}\n- Banned words: {}",
        timer, media, words
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::moderation::testing::{RecordingMessenger, UnavailableStore};
    use crate::utils::parser::SETTIMER_USAGE;

    const CHAT: i64 = -1002;
    const ADMIN: u64 = 1;
    const MEMBER: u64 = 2;

    fn setup() -> (Arc<MemoryStore>, CommandRouter) {
        let store = Arc::new(MemoryStore::new());
        let messenger = Arc::new(RecordingMessenger::new());
        messenger.grant_admin(CHAT, ADMIN);
        (store.clone(), CommandRouter::new(store, messenger))
    }

    fn from(user_id: u64, text: &str) -> IncomingMessage {
        IncomingMessage::text(CHAT, 1, text).with_sender(user_id)
    }

    #[tokio::test]
    async fn test_settimer_invalid_leaves_settings_unchanged() {
        let (store, router) = setup();
        store.upsert_timer(CHAT, 120).await.unwrap();

        let command = Command::Settimer("abc".to_string());
        let err = router.execute(&from(ADMIN, "/settimer abc"), &command).await.unwrap_err();

        assert!(matches!(err, ModerationError::Validation(_)));
        assert_eq!(err.to_string(), SETTIMER_USAGE);
        assert_eq!(store.get_settings(CHAT).await.unwrap().timer_secs, 120);
    }

    #[tokio::test]
    async fn test_settimer_and_off() {
        let (store, router) = setup();

        let reply = router
            .handle(&from(ADMIN, "/settimer 10m"), &Command::Settimer("10m".to_string()))
            .await;
        assert_eq!(reply.as_deref(), Some("Messages will be deleted after 10 minutes."));
        assert_eq!(store.get_settings(CHAT).await.unwrap().timer_secs, 600);

        router
            .handle(&from(ADMIN, "/settimer off"), &Command::Settimer("off".to_string()))
            .await;
        assert_eq!(store.get_settings(CHAT).await.unwrap().timer_secs, 0);
    }

    #[tokio::test]
    async fn test_non_admin_is_denied() {
        let (store, router) = setup();

        for command in [
            Command::Settimer("5m".to_string()),
            Command::Banword("spam".to_string()),
            Command::Nomedia(String::new()),
        ] {
            let reply = router.handle(&from(MEMBER, "/x"), &command).await;
            assert_eq!(reply, Some(format!("Only admins can use /{}.", command.name())));
        }

        let settings = store.get_settings(CHAT).await.unwrap();
        assert!(settings.is_inactive());
    }

    #[tokio::test]
    async fn test_anonymous_sender_is_denied() {
        let (_, router) = setup();
        let msg = IncomingMessage::text(CHAT, 1, "/settimer 5m");

        let err = router
            .execute(&msg, &Command::Settimer("5m".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::PermissionDenied("settimer")));
    }

    #[tokio::test]
    async fn test_permission_checked_before_usage() {
        let (_, router) = setup();
        let reply = router
            .handle(&from(MEMBER, "/settimer abc"), &Command::Settimer("abc".to_string()))
            .await;
        assert_eq!(reply.as_deref(), Some("Only admins can use /settimer."));
    }

    #[tokio::test]
    async fn test_banword_normalises_and_dedupes() {
        let (store, router) = setup();

        let reply = router
            .handle(&from(ADMIN, "/banword  SPAM "), &Command::Banword(" SPAM ".to_string()))
            .await;
        assert_eq!(reply.as_deref(), Some("Banned word added: spam"));

        let reply = router
            .handle(&from(ADMIN, "/banword spam"), &Command::Banword("spam".to_string()))
            .await;
        assert_eq!(reply.as_deref(), Some("\"spam\" is already banned."));

        assert_eq!(store.get_settings(CHAT).await.unwrap().banned_words, vec!["spam"]);
    }

    #[tokio::test]
    async fn test_banword_without_argument_shows_usage() {
        let (store, router) = setup();
        let reply = router
            .handle(&from(ADMIN, "/banword"), &Command::Banword(String::new()))
            .await;

        assert_eq!(reply.as_deref(), Some(BANWORD_USAGE));
        assert!(store.get_settings(CHAT).await.unwrap().banned_words.is_empty());
    }

    #[tokio::test]
    async fn test_unbanword() {
        let (store, router) = setup();
        store.add_banned_word(CHAT, "spam").await.unwrap();

        let reply = router
            .handle(&from(ADMIN, "/unbanword spam"), &Command::Unbanword("Spam".to_string()))
            .await;
        assert_eq!(reply.as_deref(), Some("Banned word removed: spam"));

        let reply = router
            .handle(&from(ADMIN, "/unbanword spam"), &Command::Unbanword("spam".to_string()))
            .await;
        assert_eq!(reply.as_deref(), Some("\"spam\" is not banned."));
    }

    #[tokio::test]
    async fn test_nomedia_toggle() {
        let (store, router) = setup();

        let reply = router
            .handle(&from(ADMIN, "/nomedia"), &Command::Nomedia(String::new()))
            .await;
        assert_eq!(reply.as_deref(), Some("Media messages will be deleted."));
        assert!(store.get_settings(CHAT).await.unwrap().no_media);

        router
            .handle(&from(ADMIN, "/nomedia off"), &Command::Nomedia("off".to_string()))
            .await;
        assert!(!store.get_settings(CHAT).await.unwrap().no_media);
    }

    #[tokio::test]
    async fn test_start_initializes_chat() {
        let (store, router) = setup();
        store.upsert_timer(CHAT, 60).await.unwrap();

        let reply = router
            .handle(&from(MEMBER, "/start"), &Command::Start(String::new()))
            .await;
        assert_eq!(reply.as_deref(), Some(WELCOME_TEXT));
        // Existing settings survive a second /start.
        assert_eq!(store.get_settings(CHAT).await.unwrap().timer_secs, 60);
    }

    #[tokio::test]
    async fn test_storage_failure_replies_only_for_start() {
        let messenger = Arc::new(RecordingMessenger::new());
        messenger.grant_admin(CHAT, ADMIN);
        let router = CommandRouter::new(Arc::new(UnavailableStore), messenger);

        let reply = router
            .handle(&from(ADMIN, "/start"), &Command::Start(String::new()))
            .await;
        assert_eq!(reply.as_deref(), Some(START_FAILED_TEXT));

        let reply = router
            .handle(&from(ADMIN, "/settimer 5m"), &Command::Settimer("5m".to_string()))
            .await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn test_settings_summary() {
        let (store, router) = setup();
        store.upsert_timer(CHAT, 5400).await.unwrap();
        store.add_banned_word(CHAT, "spam").await.unwrap();
        store.add_banned_word(CHAT, "scam").await.unwrap();

        let reply = router
            .handle(&from(ADMIN, "/settings"), &Command::Settings)
            .await
            .unwrap();
        assert_eq!(
            reply,
            "Settings for this chat:\n- Timer: 1 hour 30 minutes\n- Media: allowed\n- Banned words: spam, scam"
        );
    }

    #[tokio::test]
    async fn test_settings_for_unconfigured_chat() {
        let (_, router) = setup();
        let reply = router.handle(&from(ADMIN, "/settings"), &Command::Settings).await;
        assert_eq!(reply.as_deref(), Some(NO_RULES_TEXT));
    }
}

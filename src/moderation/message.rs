//! Incoming message view used by the rule evaluator and the command router.

use teloxide::types::{ChatId, Message, MessageEntityKind, MessageId, UserId};
use teloxide::utils::command::BotCommands;

use crate::plugins::Command;

/// Attachment kinds the media rule distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Photo,
    Video,
    Sticker,
    /// Any other media (animation, document, voice, ...). Never filtered.
    Other,
}

impl Attachment {
    /// Whether `/nomedia` deletes this kind.
    pub fn is_filtered_media(self) -> bool {
        matches!(self, Self::Photo | Self::Video | Self::Sticker)
    }

    fn of(msg: &Message) -> Option<Self> {
        if msg.photo().is_some() {
            Some(Self::Photo)
        } else if msg.video().is_some() {
            Some(Self::Video)
        } else if msg.sticker().is_some() {
            Some(Self::Sticker)
        } else if msg.animation().is_some()
            || msg.document().is_some()
            || msg.audio().is_some()
            || msg.voice().is_some()
            || msg.video_note().is_some()
        {
            Some(Self::Other)
        } else {
            None
        }
    }
}

/// One inbound message, reduced to what moderation looks at.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub sender_id: Option<UserId>,
    /// Message text, or the caption for media messages. Empty if neither.
    pub text: String,
    pub attachment: Option<Attachment>,
    /// Telegram marked the text as a bot command (entity at offset 0).
    /// Commands are routed, never moderated.
    pub is_command: bool,
    /// Parsed command, if it is one of ours and addressed to this bot.
    pub command: Option<Command>,
}

impl IncomingMessage {
    pub fn from_telegram(msg: &Message, bot_username: &str) -> Self {
        let command_text = msg.text().filter(|_| starts_with_bot_command(msg));

        Self {
            chat_id: msg.chat.id,
            message_id: msg.id,
            sender_id: msg.from.as_ref().map(|u| u.id),
            text: msg.text().or_else(|| msg.caption()).unwrap_or_default().to_string(),
            attachment: Attachment::of(msg),
            is_command: command_text.is_some(),
            command: command_text.and_then(|t| Command::parse(t, bot_username).ok()),
        }
    }
}

/// A leading `/` alone is not enough: "/ buy now" carries no command entity.
fn starts_with_bot_command(msg: &Message) -> bool {
    msg.entities().is_some_and(|entities| {
        entities
            .iter()
            .any(|e| e.offset == 0 && matches!(e.kind, MessageEntityKind::BotCommand))
    })
}

#[cfg(test)]
impl IncomingMessage {
    pub fn text(chat_id: i64, message_id: i32, text: &str) -> Self {
        Self {
            chat_id: ChatId(chat_id),
            message_id: MessageId(message_id),
            sender_id: None,
            text: text.to_string(),
            attachment: None,
            is_command: false,
            command: None,
        }
    }

    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    #[must_use]
    pub fn with_sender(mut self, user_id: u64) -> Self {
        self.sender_id = Some(UserId(user_id));
        self
    }

    #[must_use]
    pub fn with_command(mut self, command: Command) -> Self {
        self.is_command = true;
        self.command = Some(command);
        self
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use serde_json::{json, Value};

    use super::*;
    use crate::database::ChatSettings;
    use crate::moderation::rules::{evaluate, Action, DeleteReason};

    const BOT: &str = "AutoDeleteBot";

    fn message(fields: Value) -> Message {
        let mut raw = json!({
            "message_id": 42,
            "date": 1_700_000_000,
            "chat": { "id": -1001, "type": "supergroup", "title": "Group" },
            "from": { "id": 7, "is_bot": false, "first_name": "Alice" },
        });
        if let (Some(raw), Some(extra)) = (raw.as_object_mut(), fields.as_object()) {
            raw.extend(extra.clone());
        }
        serde_json::from_value(raw).unwrap()
    }

    fn command_entity(length: usize) -> Value {
        json!([{ "type": "bot_command", "offset": 0, "length": length }])
    }

    #[test]
    fn test_plain_text_message() {
        let msg = IncomingMessage::from_telegram(&message(json!({ "text": "hello" })), BOT);

        assert_eq!(msg.chat_id, ChatId(-1001));
        assert_eq!(msg.message_id, MessageId(42));
        assert_eq!(msg.sender_id, Some(UserId(7)));
        assert_eq!(msg.text, "hello");
        assert_eq!(msg.attachment, None);
        assert!(!msg.is_command);
    }

    #[test]
    fn test_slash_without_command_entity_is_moderated() {
        let raw = message(json!({ "text": "/ buy spam now" }));
        let msg = IncomingMessage::from_telegram(&raw, BOT);

        assert!(!msg.is_command);
        assert_eq!(msg.command, None);

        let settings = ChatSettings {
            banned_words: vec!["spam".to_string()],
            ..ChatSettings::new(-1001)
        };
        let now = DateTime::from_timestamp(0, 0).unwrap();
        assert_eq!(
            evaluate(&settings, &msg, now),
            Action::DeleteNow(DeleteReason::BannedWord)
        );
    }

    #[test]
    fn test_command_entity_not_at_start_is_not_a_command() {
        let raw = message(json!({
            "text": "see /help",
            "entities": [{ "type": "bot_command", "offset": 4, "length": 5 }],
        }));
        assert!(!IncomingMessage::from_telegram(&raw, BOT).is_command);
    }

    #[test]
    fn test_command_is_parsed() {
        let raw = message(json!({ "text": "/settimer 5m", "entities": command_entity(9) }));
        let msg = IncomingMessage::from_telegram(&raw, BOT);

        assert!(msg.is_command);
        assert_eq!(msg.command, Some(Command::Settimer("5m".to_string())));
    }

    #[test]
    fn test_command_for_another_bot_is_not_ours() {
        let raw = message(json!({
            "text": "/settimer@OtherBot 5m",
            "entities": command_entity(18),
        }));
        let msg = IncomingMessage::from_telegram(&raw, BOT);

        assert!(msg.is_command);
        assert_eq!(msg.command, None);
    }

    #[test]
    fn test_caption_counts_as_text() {
        let raw = message(json!({
            "photo": [{ "file_id": "p", "file_unique_id": "pu", "width": 90, "height": 90 }],
            "caption": "cheap SPAM",
        }));
        let msg = IncomingMessage::from_telegram(&raw, BOT);

        assert_eq!(msg.text, "cheap SPAM");
        assert_eq!(msg.attachment, Some(Attachment::Photo));
    }

    #[test]
    fn test_filtered_media_kinds() {
        let cases = [
            (
                json!({ "photo": [{ "file_id": "p", "file_unique_id": "pu", "width": 90, "height": 90 }] }),
                Attachment::Photo,
            ),
            (
                json!({ "video": {
                    "file_id": "v", "file_unique_id": "vu",
                    "width": 640, "height": 480, "duration": 5,
                } }),
                Attachment::Video,
            ),
            (
                json!({ "sticker": {
                    "file_id": "s", "file_unique_id": "su", "type": "regular",
                    "width": 512, "height": 512, "is_animated": false, "is_video": false,
                } }),
                Attachment::Sticker,
            ),
        ];

        for (fields, expected) in cases {
            let msg = IncomingMessage::from_telegram(&message(fields), BOT);
            assert_eq!(msg.attachment, Some(expected));
            assert!(expected.is_filtered_media());
        }
    }

    #[test]
    fn test_other_media_is_not_filtered() {
        let cases = [
            json!({ "document": { "file_id": "d", "file_unique_id": "du" } }),
            json!({ "animation": {
                "file_id": "a", "file_unique_id": "au",
                "width": 320, "height": 240, "duration": 3,
            } }),
        ];

        for fields in cases {
            let msg = IncomingMessage::from_telegram(&message(fields), BOT);
            assert_eq!(msg.attachment, Some(Attachment::Other));
            assert!(!Attachment::Other.is_filtered_media());
        }
    }
}

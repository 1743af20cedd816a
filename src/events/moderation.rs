//! Message moderation handler.
//!
//! Converts each Telegram message into an [`IncomingMessage`] and hands it
//! to the [`Moderator`](crate::moderation::Moderator). Failures are logged
//! and never stop the dispatcher.

use teloxide::prelude::*;
use teloxide::types::Me;
use tracing::{debug, warn};

use crate::bot::dispatcher::AppState;
use crate::error::ModerationError;
use crate::moderation::{IncomingMessage, Outcome};

pub async fn handle_message(msg: Message, me: Me, state: AppState) -> anyhow::Result<()> {
    let incoming = IncomingMessage::from_telegram(&msg, me.username());

    match state.moderator.process_incoming_message(&incoming).await {
        Ok(Outcome::Allowed) | Ok(Outcome::Ignored) => {}
        Ok(outcome) => {
            debug!("chat={} message={}: {:?}", msg.chat.id, msg.id.0, outcome);
        }
        Err(ModerationError::StorageUnavailable(e)) => {
            warn!("Storage unavailable, message {} in chat {} left as is: {}", msg.id.0, msg.chat.id, e);
        }
        Err(e) => warn!("{}", e),
    }

    Ok(())
}

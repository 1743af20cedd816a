//! Error kinds raised by the moderation core.

use thiserror::Error;

/// Failures the message path, the sweeper and the command router report.
///
/// None of these are fatal: the caller logs them and moves on to the next
/// update or the next queued deletion.
#[derive(Debug, Error)]
pub enum ModerationError {
    /// Settings or expiry storage could not be read or written.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Telegram refused or failed to delete a message.
    #[error("failed to delete message {message_id} in chat {chat_id}: {reason}")]
    DeleteFailed {
        chat_id: i64,
        message_id: i32,
        reason: String,
    },

    /// Malformed admin command. The message is the usage text shown to the user.
    #[error("{0}")]
    Validation(String),

    /// Admin command sent by a non-admin.
    #[error("Only admins can use /{0}.")]
    PermissionDenied(&'static str),
}

impl ModerationError {
    pub fn storage(err: anyhow::Error) -> Self {
        Self::StorageUnavailable(format!("{err:#}"))
    }
}

//! Messages queued for timed deletion.

use chrono::{DateTime, Utc};

/// A message that should be deleted once `deadline` has passed.
///
/// Identity is `(chat_id, message_id)`. The deadline is fixed when the
/// entry is created; later timer changes do not move it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledDeletion {
    pub chat_id: i64,
    pub message_id: i32,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
}

impl ScheduledDeletion {
    pub fn new(
        chat_id: i64,
        message_id: i32,
        created_at: DateTime<Utc>,
        deadline: DateTime<Utc>,
    ) -> Self {
        Self {
            chat_id,
            message_id,
            created_at,
            deadline,
        }
    }

    pub fn key(&self) -> (i64, i32) {
        (self.chat_id, self.message_id)
    }
}

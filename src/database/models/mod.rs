//! Database models.

pub mod chat_settings;
pub mod scheduled_deletion;

pub use chat_settings::ChatSettings;
pub use scheduled_deletion::ScheduledDeletion;

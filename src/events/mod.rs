//! Update handlers.
//!
//! Telegram updates enter the moderation core here.

pub mod moderation;

//! Moderation core.
//!
//! - `message` - platform-neutral view of an incoming message
//! - `rules` - the pure rule evaluator
//! - `processor` - applies the evaluator's decision to one message
//! - `sweeper` - deletes queued messages once their deadline passes
//! - `messenger` - the outbound seam to Telegram

pub mod message;
pub mod messenger;
pub mod processor;
pub mod rules;
pub mod sweeper;

#[cfg(test)]
pub mod testing;

pub use message::IncomingMessage;
pub use messenger::Messenger;
pub use processor::{Moderator, Outcome};
pub use sweeper::Sweeper;

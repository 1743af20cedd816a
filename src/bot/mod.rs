//! Bot module - Telegram wiring.

pub mod dispatcher;
mod runtime;
mod telegram;
mod webhook;

pub use dispatcher::{build_dispatcher, ThrottledBot};
pub use runtime::run;
pub use telegram::TelegramMessenger;

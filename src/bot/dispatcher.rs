//! Message dispatcher setup.

use std::sync::Arc;

use teloxide::adaptors::Throttle;
use teloxide::dispatching::{DefaultKey, UpdateHandler};
use teloxide::prelude::*;

use crate::events;
use crate::moderation::Moderator;

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

pub type BotDispatcher = Dispatcher<ThrottledBot, anyhow::Error, DefaultKey>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub moderator: Arc<Moderator>,
}

/// Build the dispatcher.
pub fn build_dispatcher(bot: ThrottledBot, moderator: Arc<Moderator>) -> BotDispatcher {
    let state = AppState { moderator };

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
}

/// Every message, command or not, goes through the moderation handler.
/// Other update kinds are dropped.
fn schema() -> UpdateHandler<anyhow::Error> {
    use teloxide::dispatching::UpdateFilterExt;

    dptree::entry().branch(Update::filter_message().endpoint(events::moderation::handle_message))
}

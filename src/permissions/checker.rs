//! Permission checker with caching.

use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatMemberKind, UserId};
use tracing::debug;

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};

/// Cache key for admin lookups.
type AdminCacheKey = (i64, u64); // (chat_id, user_id)

/// Admin checker with a short-lived cache of Telegram's answers.
#[derive(Clone)]
pub struct Permissions {
    bot: Bot,
    cache: TypedCache<AdminCacheKey, bool>,
    owner_ids: Arc<[u64]>,
}

impl Permissions {
    pub fn with_owners(bot: Bot, cache_registry: &CacheRegistry, owner_ids: Vec<u64>) -> Self {
        let cache = cache_registry.get_or_create(
            "admin_permissions",
            CacheConfig::with_capacity(10_000)
                .ttl(Duration::from_secs(300)) // 5 minutes
                .tti(Duration::from_secs(120)), // 2 minutes idle
        );

        Self {
            bot,
            cache,
            owner_ids: owner_ids.into(),
        }
    }

    #[inline]
    pub fn is_bot_owner(&self, user_id: UserId) -> bool {
        self.owner_ids.contains(&user_id.0)
    }

    /// Check if a user is an administrator or the creator of the chat.
    pub async fn is_admin(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<bool> {
        if self.is_bot_owner(user_id) {
            return Ok(true);
        }

        let cache_key = (chat_id.0, user_id.0);
        if let Some(cached) = self.cache.get(&cache_key) {
            debug!("Admin cache hit for user {} in chat {}", user_id, chat_id);
            return Ok(cached);
        }

        let member = self.bot.get_chat_member(chat_id, user_id).await?;
        let is_admin = matches!(
            member.kind,
            ChatMemberKind::Owner(_) | ChatMemberKind::Administrator(_)
        );

        self.cache.insert(cache_key, is_admin);
        debug!("Admin lookup for user {} in chat {}: {}", user_id, chat_id, is_admin);
        Ok(is_admin)
    }
}

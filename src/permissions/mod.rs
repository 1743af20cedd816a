//! Admin checks for moderation commands.
//!
//! Lookups hit `getChatMember` once and are cached per `(chat, user)`.
//! Bot owners from `OWNER_IDS` count as admins everywhere.

mod checker;

pub use checker::Permissions;

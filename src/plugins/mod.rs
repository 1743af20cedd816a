//! Bot commands.
//!
//! Commands are parsed into [`Command`] when an update arrives and executed
//! by the [`CommandRouter`] before any moderation rule is looked at.

pub mod help;
mod router;

use teloxide::utils::command::BotCommands;

pub use router::CommandRouter;

/// All bot commands.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Initialize the bot in this chat")]
    Start(String),

    #[command(description = "Show this help message")]
    Help,

    #[command(description = "Delete messages after <N>m, or \"off\" [admin]")]
    Settimer(String),

    #[command(description = "Delete messages containing a word [admin]")]
    Banword(String),

    #[command(description = "Remove a banned word [admin]")]
    Unbanword(String),

    #[command(description = "Delete photos, videos and stickers (on/off) [admin]")]
    Nomedia(String),

    #[command(description = "Show this chat's settings [admin]")]
    Settings,
}

impl Command {
    /// Command name without the leading slash.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start(_) => "start",
            Self::Help => "help",
            Self::Settimer(_) => "settimer",
            Self::Banword(_) => "banword",
            Self::Unbanword(_) => "unbanword",
            Self::Nomedia(_) => "nomedia",
            Self::Settings => "settings",
        }
    }

    /// Whether only chat administrators may run it.
    pub fn is_admin_only(&self) -> bool {
        !matches!(self, Self::Start(_) | Self::Help)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("/settimer 5m", "AutoDeleteBot").unwrap(),
            Command::Settimer("5m".to_string())
        );
        assert_eq!(
            Command::parse("/banword@AutoDeleteBot spam", "AutoDeleteBot").unwrap(),
            Command::Banword("spam".to_string())
        );
        assert_eq!(Command::parse("/help", "AutoDeleteBot").unwrap(), Command::Help);
    }

    #[test]
    fn test_command_for_other_bot_is_rejected() {
        assert!(Command::parse("/settimer@OtherBot 5m", "AutoDeleteBot").is_err());
        assert!(Command::parse("/ban 5", "AutoDeleteBot").is_err());
    }

    #[test]
    fn test_admin_only() {
        assert!(!Command::Help.is_admin_only());
        assert!(!Command::Start(String::new()).is_admin_only());
        assert!(Command::Settings.is_admin_only());
        assert!(Command::Nomedia(String::new()).is_admin_only());
    }
}

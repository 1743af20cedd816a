//! Texts for /start and /help.

pub const WELCOME_TEXT: &str = "Welcome to the Auto-Delete Bot! \
I can delete messages based on time, content, or media type. \
Use /help to see available commands.";

pub const START_FAILED_TEXT: &str = "Error initializing bot. Please try again.";

pub const HELP_TEXT: &str = "Available commands:
- /start - Initialize the bot and see the welcome message.
- /help - Show this help message.
- /settimer <minutes>m - Delete messages after the given time (e.g., /settimer 5m). Use /settimer off to disable [Admin only].
- /banword <word> - Delete messages containing the word (e.g., /banword spam) [Admin only].
- /unbanword <word> - Stop deleting messages containing the word [Admin only].
- /nomedia [on|off] - Delete all photos, videos, and stickers [Admin only].
- /settings - Show the current settings for this chat [Admin only].";

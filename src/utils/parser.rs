//! Argument parsing for admin commands.
//!
//! Parse failures come back as [`ModerationError::Validation`] carrying the
//! usage text, which the router sends back to the chat unchanged.

use crate::error::ModerationError;

/// Longest accepted timer. Telegram refuses to let bots delete messages
/// older than 48 hours.
pub const MAX_TIMER_MINUTES: u32 = 48 * 60;

pub const SETTIMER_USAGE: &str = "Usage: /settimer <minutes>m (e.g., /settimer 5m)";
pub const BANWORD_USAGE: &str = "Usage: /banword <word>";
pub const UNBANWORD_USAGE: &str = "Usage: /unbanword <word>";
pub const NOMEDIA_USAGE: &str = "Usage: /nomedia [on|off]";

/// Parsed `/settimer` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSetting {
    Minutes(u32),
    Off,
}

impl TimerSetting {
    pub fn as_secs(self) -> u32 {
        match self {
            Self::Minutes(m) => m * 60,
            Self::Off => 0,
        }
    }
}

/// Parse `<N>m` (1 ≤ N ≤ 2880) or `off`.
pub fn parse_timer(input: &str) -> Result<TimerSetting, ModerationError> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("off") {
        return Ok(TimerSetting::Off);
    }

    let usage = || ModerationError::Validation(SETTIMER_USAGE.to_string());

    let digits = input.strip_suffix('m').ok_or_else(usage)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(usage());
    }

    // Overflowing u32 is just "too large".
    let minutes = digits.parse::<u32>().unwrap_or(u32::MAX);
    match minutes {
        0 => Err(usage()),
        m if m > MAX_TIMER_MINUTES => Err(ModerationError::Validation(format!(
            "Timer can be at most {} minutes (48 hours).",
            MAX_TIMER_MINUTES
        ))),
        m => Ok(TimerSetting::Minutes(m)),
    }
}

/// Parse an on/off switch. No argument means "on".
pub fn parse_toggle(input: &str) -> Result<bool, ModerationError> {
    match input.trim().to_lowercase().as_str() {
        "" | "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(ModerationError::Validation(NOMEDIA_USAGE.to_string())),
    }
}

/// Normalise a word for the banned list: trimmed and lowercased.
pub fn normalize_word(input: &str) -> Option<String> {
    let word = input.trim().to_lowercase();
    (!word.is_empty()).then_some(word)
}

/// Human-readable duration, e.g. "1 hour 30 minutes".
pub fn format_duration(secs: u32) -> String {
    fn unit(n: u32, name: &str) -> String {
        if n == 1 {
            format!("1 {}", name)
        } else {
            format!("{} {}s", n, name)
        }
    }

    if secs < 60 {
        unit(secs, "second")
    } else if secs < 3600 {
        unit(secs / 60, "minute")
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins > 0 {
            format!("{} {}", unit(hours, "hour"), unit(mins, "minute"))
        } else {
            unit(hours, "hour")
        }
    }
}

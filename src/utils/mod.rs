//! Utility functions.

pub mod parser;

pub use parser::{format_duration, normalize_word, parse_timer, parse_toggle, TimerSetting};

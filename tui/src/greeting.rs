//! Landing view text

use chrono::Timelike;

/// Greeting for the given hour of day (0-23)
#[must_use]
pub fn greeting_for_hour(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

/// Greeting for the current local time
#[must_use]
pub fn greeting_now() -> &'static str {
    greeting_for_hour(chrono::Local::now().hour())
}

/// Hint shown under the greeting
pub const LANDING_HINT: &str = "Ask a question about your data to start a conversation.";

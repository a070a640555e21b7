//! Theme and Colors

use ratatui::style::{Color, Modifier, Style};

use databot_core::HeaderLevel;

// ============================================================================
// Role Colors
// ============================================================================

/// User input green
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// Assistant accent
pub const ASSISTANT_CYAN: Color = Color::Rgb(110, 200, 230);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

// ============================================================================
// Rich Text Colors
// ============================================================================

/// Inline code and code blocks
pub const CODE_AMBER: Color = Color::Rgb(240, 200, 120);

/// Safe link labels
pub const LINK_BLUE: Color = Color::Rgb(100, 180, 255);

/// Headers
pub const HEADER_WHITE: Color = Color::Rgb(240, 240, 240);

/// Style for a header line
#[must_use]
pub fn header_style(level: HeaderLevel) -> Style {
    let base = Style::default().fg(HEADER_WHITE).add_modifier(Modifier::BOLD);
    match level {
        HeaderLevel::H1 => base.add_modifier(Modifier::UNDERLINED),
        HeaderLevel::H2 => base,
        HeaderLevel::H3 => base.fg(ASSISTANT_CYAN),
    }
}

/// Style for code
#[must_use]
pub fn code_style() -> Style {
    Style::default().fg(CODE_AMBER)
}

/// Style for a link label
#[must_use]
pub fn link_style() -> Style {
    Style::default().fg(LINK_BLUE).add_modifier(Modifier::UNDERLINED)
}

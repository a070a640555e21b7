//! Display State Types
//!
//! The TUI is a thin client: the conversation engine tells it what to show
//! through [`PresentationSurface`], and [`DisplayState`] keeps exactly that
//! for the renderer.

use std::time::{Duration, Instant};

use ratatui::style::Style;
use ratatui::text::Line;

use databot_core::{ChatMessage, MessageContent, MessageRole, PresentationSurface, Transcript};

use crate::theme::{ASSISTANT_CYAN, DIM_GRAY, USER_GREEN};
use crate::widgets::{render_lines, render_literal};

/// Frames of the typing animation
const TYPING_FRAMES: [&str; 4] = ["", ".", "..", "..."];

/// Time per typing animation frame
const TYPING_FRAME: Duration = Duration::from_millis(300);

/// Display role for messages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRole {
    /// User input
    User,
    /// The assistant
    Assistant,
    /// Connection notices
    System,
}

impl From<MessageRole> for DisplayRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => DisplayRole::User,
            MessageRole::Assistant => DisplayRole::Assistant,
            MessageRole::System => DisplayRole::System,
        }
    }
}

impl DisplayRole {
    /// Get the prefix for this role
    pub fn prefix(&self) -> &'static str {
        match self {
            DisplayRole::User => "You: ",
            DisplayRole::Assistant => "Databot: ",
            DisplayRole::System => "",
        }
    }

    /// Base style for this role
    pub fn style(&self) -> Style {
        match self {
            DisplayRole::User => Style::default().fg(USER_GREEN),
            DisplayRole::Assistant => Style::default(),
            DisplayRole::System => Style::default().fg(DIM_GRAY),
        }
    }

    /// Style for the prefix
    pub fn prefix_style(&self) -> Style {
        match self {
            DisplayRole::User => Style::default().fg(USER_GREEN),
            DisplayRole::Assistant => Style::default().fg(ASSISTANT_CYAN),
            DisplayRole::System => Style::default().fg(DIM_GRAY),
        }
    }
}

/// Everything the engine has asked the TUI to show
#[derive(Debug, Default)]
pub struct DisplayState {
    /// Messages in order
    pub transcript: Transcript,
    /// Whether input is accepted
    pub input_enabled: bool,
    /// Whether the conversation view replaced the landing view
    pub active: bool,
    /// When the typing marker appeared, if it is showing
    pub typing_since: Option<Instant>,
}

impl DisplayState {
    /// Landing view, input disabled
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the typing marker is showing
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.typing_since.is_some()
    }

    /// Current typing animation text, if showing
    #[must_use]
    pub fn typing_text(&self) -> Option<String> {
        let since = self.typing_since?;
        let frame = (since.elapsed().as_millis() / TYPING_FRAME.as_millis()) as usize;
        Some(format!(
            "{}typing{}",
            DisplayRole::Assistant.prefix(),
            TYPING_FRAMES[frame % TYPING_FRAMES.len()]
        ))
    }

    /// Lay out the whole transcript for `width` columns
    ///
    /// Messages are separated by a blank line.
    #[must_use]
    pub fn transcript_lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for message in self.transcript.messages() {
            lines.extend(message_lines(message, width));
            lines.push(Line::default());
        }
        if let Some(typing) = self.typing_text() {
            lines.push(Line::styled(typing, Style::default().fg(DIM_GRAY)));
        }
        lines
    }
}

/// Lay out one message with its role prefix
#[must_use]
pub fn message_lines(message: &ChatMessage, width: usize) -> Vec<Line<'static>> {
    let role = DisplayRole::from(message.role());
    let prefix = Some((role.prefix().to_string(), role.prefix_style()));
    match message.content() {
        MessageContent::Literal(text) => render_literal(text, prefix, role.style(), width),
        MessageContent::Rich(nodes) => render_lines(nodes, prefix, role.style(), width),
    }
}

impl PresentationSurface for DisplayState {
    fn append_message(&mut self, role: MessageRole, content: MessageContent) {
        tracing::trace!(?role, "append message");
        self.transcript.append(role, content);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn reveal_active_surface(&mut self) {
        self.active = true;
    }

    fn show_typing(&mut self) {
        self.typing_since = Some(Instant::now());
    }

    fn hide_typing(&mut self) {
        self.typing_since = None;
    }
}

//! TextBlock Widget
//!
//! A borderless region showing pre-wrapped lines, anchored to the bottom and
//! scrollable upwards.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::StatefulWidget;

/// State for a scrollable text block
#[derive(Debug, Default)]
pub struct TextBlockState {
    /// Scroll offset (lines from bottom, 0 = latest)
    pub scroll_offset: usize,
    /// Total content lines at the last render
    pub total_lines: usize,
}

impl TextBlockState {
    /// Scroll towards older lines
    pub fn scroll_up(&mut self, lines: usize) {
        let max = self.total_lines.saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + lines).min(max);
    }

    /// Scroll towards the latest line
    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Jump to the latest line
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }
}

/// A borderless, bottom-anchored block of lines
pub struct TextBlock<'a> {
    lines: &'a [Line<'static>],
}

impl<'a> TextBlock<'a> {
    /// Block over already wrapped lines
    pub fn new(lines: &'a [Line<'static>]) -> Self {
        Self { lines }
    }
}

impl StatefulWidget for TextBlock<'_> {
    type State = TextBlockState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let height = area.height as usize;
        state.total_lines = self.lines.len();

        // Clamp scroll
        let max_scroll = state.total_lines.saturating_sub(height);
        state.scroll_offset = state.scroll_offset.min(max_scroll);

        let visible_end = state.total_lines - state.scroll_offset;
        let visible_start = visible_end.saturating_sub(height);

        for (i, line) in self.lines[visible_start..visible_end].iter().enumerate() {
            let y = area.y + i as u16;
            buf.set_line(area.x, y, line, area.width);
        }

        // Fade hint when there is more below
        if state.scroll_offset > 0 && area.height > 0 {
            let hint = format!("[+{} lines]", state.scroll_offset);
            let x = area.x + area.width.saturating_sub(hint.len() as u16);
            buf.set_string(
                x,
                area.y + area.height - 1,
                hint,
                Style::default().fg(Color::Rgb(120, 120, 120)),
            );
        }
    }
}

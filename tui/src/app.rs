//! Main Application
//!
//! The App is a thin display client around a databot session:
//! - Terminal events are turned into submissions for the engine
//! - Transport events from the session queue are fed to the engine
//! - The engine updates `DisplayState` through the presentation surface
//! - Rendering reads `DisplayState` only

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};

use databot_core::{ConversationEvent, Disposition, RejectReason, Session, Transport};

use crate::display::DisplayState;
use crate::greeting::LANDING_HINT;
use crate::theme::{ASSISTANT_CYAN, DIM_GRAY, ERROR_RED, HEADER_WHITE, USER_GREEN};
use crate::widgets::{TextBlock, TextBlockState};

/// Input box height (lines), separator included
const INPUT_HEIGHT: u16 = 5;

/// Redraw interval for the typing animation
const TICK: Duration = Duration::from_millis(100);

/// Main application state
pub struct App<T: Transport> {
    /// Is the app still running?
    running: bool,
    /// The conversation; the engine owns the display state
    session: Session<DisplayState, T>,
    /// User input buffer
    input_buffer: String,
    /// Why the last submission was refused, until the next keypress
    notice: Option<RejectReason>,
    /// Conversation scroll state
    scroll: TextBlockState,
    /// Landing view greeting
    greeting: &'static str,
    /// Terminal size
    size: (u16, u16),
}

impl<T: Transport> App<T> {
    /// Create a new App around a wired session
    pub fn new(session: Session<DisplayState, T>, greeting: &'static str) -> Self {
        Self {
            running: true,
            session,
            input_buffer: String::new(),
            notice: None,
            scroll: TextBlockState::default(),
            greeting,
            size: (80, 24),
        }
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();
        let mut tick = tokio::time::interval(TICK);

        let size = terminal.size()?;
        self.size = (size.width, size.height);
        self.render(terminal)?;

        while self.running {
            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key);
                    }
                    Some(Ok(Event::Resize(w, h))) => self.size = (w, h),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "terminal event stream failed");
                        self.quit();
                    }
                    None => self.quit(),
                },

                // Transport events for the engine
                Some(event) = self.session.receiver.recv() => {
                    self.session.engine.handle_event(event);
                }

                // Typing animation
                _ = tick.tick() => {}
            }

            self.render(terminal)?;
        }

        Ok(())
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        self.notice = None;
        match key.code {
            KeyCode::Esc => self.quit(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit(),

            KeyCode::Enter => self.submit(),

            KeyCode::Char(c) if self.input_enabled() => self.input_buffer.push(c),
            KeyCode::Backspace if self.input_enabled() => {
                self.input_buffer.pop();
            }

            // Conversation scrolling
            KeyCode::PageUp => self.scroll.scroll_up(self.page_size()),
            KeyCode::PageDown => self.scroll.scroll_down(self.page_size()),
            KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll.scroll_to_bottom();
            }

            _ => {}
        }
    }

    /// Hand the input buffer to the engine
    ///
    /// The buffer is kept when the engine refuses it, so the user can fix
    /// it up.
    fn submit(&mut self) {
        if !self.input_enabled() {
            return;
        }
        let event = ConversationEvent::submit(self.input_buffer.clone());
        match self.session.engine.handle_event(event) {
            Disposition::Accepted => {
                self.input_buffer.clear();
                self.scroll.scroll_to_bottom();
            }
            Disposition::Rejected(reason) => self.notice = Some(reason),
            _ => {}
        }
    }

    /// Close the connection and stop the loop
    pub fn quit(&mut self) {
        self.session.engine.shutdown();
        self.running = false;
    }

    /// Is the app still running?
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current input buffer
    pub fn input(&self) -> &str {
        &self.input_buffer
    }

    /// The display state the engine writes to
    pub fn display(&self) -> &DisplayState {
        self.session.engine.surface()
    }

    /// The wired session
    pub fn session_mut(&mut self) -> &mut Session<DisplayState, T> {
        &mut self.session
    }

    fn input_enabled(&self) -> bool {
        self.display().input_enabled
    }

    fn page_size(&self) -> usize {
        (self.size.1.saturating_sub(INPUT_HEIGHT + 1) / 2).max(1) as usize
    }

    /// Draw one frame
    pub fn render<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        terminal.draw(|frame| self.draw(frame))?;
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let [body, input, status] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
        ])
        .areas(area);

        if self.display().active {
            let lines = self.display().transcript_lines(body.width as usize);
            frame.render_stateful_widget(TextBlock::new(&lines), body, &mut self.scroll);
        } else {
            self.draw_landing(frame, body);
        }
        self.draw_input(frame, input);
        self.draw_status(frame, status);
    }

    /// Greeting view shown until the first accepted submission
    fn draw_landing(&self, frame: &mut Frame<'_>, area: Rect) {
        let top = area.height.saturating_sub(2) / 2;
        let text: Vec<Line<'static>> = std::iter::repeat(Line::default())
            .take(top as usize)
            .chain([
                Line::styled(
                    self.greeting,
                    Style::default()
                        .fg(HEADER_WHITE)
                        .add_modifier(Modifier::BOLD),
                ),
                Line::styled(LANDING_HINT, Style::default().fg(DIM_GRAY)),
            ])
            .collect();
        frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
    }

    fn draw_input(&self, frame: &mut Frame<'_>, area: Rect) {
        if area.height == 0 {
            return;
        }
        let separator = "-".repeat(area.width as usize);
        let mut lines = vec![Line::styled(separator, Style::default().fg(DIM_GRAY))];

        let text_height = area.height.saturating_sub(1) as usize;
        let text_width = (area.width.saturating_sub(1) as usize).max(5);

        let (full_input, style) = if self.input_enabled() {
            (
                format!("You: {}_", self.input_buffer),
                Style::default().fg(USER_GREEN),
            )
        } else {
            (
                format!("You: {}", self.input_buffer),
                Style::default().fg(DIM_GRAY),
            )
        };
        let wrapped: Vec<String> = textwrap::wrap(&full_input, text_width)
            .iter()
            .map(|s| s.to_string())
            .collect();
        let skip = wrapped.len().saturating_sub(text_height);
        lines.extend(wrapped.into_iter().skip(skip).map(|l| Line::styled(l, style)));

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_status(&self, frame: &mut Frame<'_>, area: Rect) {
        let engine = &self.session.engine;
        let (state, style) = if let Some(reason) = &self.notice {
            (reason.to_string(), Style::default().fg(ERROR_RED))
        } else if engine.is_terminal() {
            (
                engine.transport().state().to_string(),
                Style::default().fg(ERROR_RED),
            )
        } else if engine.is_reply_pending() {
            ("waiting for reply".to_string(), Style::default().fg(ASSISTANT_CYAN))
        } else {
            (
                engine.transport().state().to_string(),
                Style::default().fg(DIM_GRAY),
            )
        };

        let scroll_info = if self.scroll.scroll_offset > 0 {
            format!(" [^{} lines - PgDn to scroll]", self.scroll.scroll_offset)
        } else {
            String::new()
        };
        let status = format!(" {state} | Esc to quit | PgUp/PgDn scroll{scroll_info}");
        frame.render_widget(Paragraph::new(Line::styled(status, style)), area);
    }
}

//! Presentation Surface
//!
//! The UI seam. The engine drives a surface through five calls and never
//! reads anything back from it.

use crate::transcript::{MessageContent, MessageRole, Transcript};

/// What a UI must implement to host a conversation
pub trait PresentationSurface {
    /// Append a message to the visible transcript
    fn append_message(&mut self, role: MessageRole, content: MessageContent);

    /// Enable or disable the input field
    fn set_input_enabled(&mut self, enabled: bool);

    /// Switch from the landing view to the conversation view
    fn reveal_active_surface(&mut self);

    /// Show the "assistant is responding" marker
    fn show_typing(&mut self);

    /// Remove the "assistant is responding" marker
    fn hide_typing(&mut self);
}

/// A recorded surface call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceCall {
    /// `append_message`
    Append(MessageRole, MessageContent),
    /// `set_input_enabled`
    SetInputEnabled(bool),
    /// `reveal_active_surface`
    RevealActive,
    /// `show_typing`
    ShowTyping,
    /// `hide_typing`
    HideTyping,
}

/// Surface without a UI
///
/// Keeps a transcript and the visible flags, and records every call in
/// order. Used for tests and for driving the engine from scripts.
#[derive(Clone, Debug, Default)]
pub struct HeadlessSurface {
    transcript: Transcript,
    calls: Vec<SurfaceCall>,
    input_enabled: bool,
    active: bool,
    typing: bool,
}

impl HeadlessSurface {
    /// Fresh surface: landing view, input disabled, no typing marker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages appended so far
    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Every call received, in order
    #[must_use]
    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// Take and clear the recorded calls
    pub fn take_calls(&mut self) -> Vec<SurfaceCall> {
        std::mem::take(&mut self.calls)
    }

    /// Whether the input field is enabled
    #[must_use]
    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Whether the conversation view is showing
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the typing marker is showing
    #[must_use]
    pub fn typing_visible(&self) -> bool {
        self.typing
    }
}

impl PresentationSurface for HeadlessSurface {
    fn append_message(&mut self, role: MessageRole, content: MessageContent) {
        self.calls.push(SurfaceCall::Append(role, content.clone()));
        self.transcript.append(role, content);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.calls.push(SurfaceCall::SetInputEnabled(enabled));
        self.input_enabled = enabled;
    }

    fn reveal_active_surface(&mut self) {
        self.calls.push(SurfaceCall::RevealActive);
        self.active = true;
    }

    fn show_typing(&mut self) {
        self.calls.push(SurfaceCall::ShowTyping);
        self.typing = true;
    }

    fn hide_typing(&mut self) {
        self.calls.push(SurfaceCall::HideTyping);
        self.typing = false;
    }
}

impl<S: PresentationSurface + ?Sized> PresentationSurface for &mut S {
    fn append_message(&mut self, role: MessageRole, content: MessageContent) {
        (**self).append_message(role, content);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        (**self).set_input_enabled(enabled);
    }

    fn reveal_active_surface(&mut self) {
        (**self).reveal_active_surface();
    }

    fn show_typing(&mut self) {
        (**self).show_typing();
    }

    fn hide_typing(&mut self) {
        (**self).hide_typing();
    }
}

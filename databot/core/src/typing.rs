//! Typing Indicator Controller
//!
//! Controls the single "assistant is responding" marker. At most one handle
//! is live; `show` and `hide` are idempotent and only touch the surface when
//! visibility actually changes.

use std::time::{Duration, Instant};

use crate::surface::PresentationSurface;

/// The live typing marker
#[derive(Debug)]
pub struct TypingHandle {
    shown_at: Instant,
}

impl TypingHandle {
    /// Time since the marker appeared
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.shown_at.elapsed()
    }
}

/// Owner of the optional typing handle
#[derive(Debug, Default)]
pub struct TypingIndicator {
    handle: Option<TypingHandle>,
}

impl TypingIndicator {
    /// Hidden indicator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the marker. Returns `true` if it was hidden before.
    pub fn show<S: PresentationSurface + ?Sized>(&mut self, surface: &mut S) -> bool {
        if self.handle.is_some() {
            return false;
        }
        self.handle = Some(TypingHandle {
            shown_at: Instant::now(),
        });
        surface.show_typing();
        true
    }

    /// Hide the marker. Returns `true` if it was showing before.
    pub fn hide<S: PresentationSurface + ?Sized>(&mut self, surface: &mut S) -> bool {
        let Some(handle) = self.handle.take() else {
            return false;
        };
        tracing::debug!(elapsed_ms = handle.elapsed().as_millis(), "typing indicator hidden");
        surface.hide_typing();
        true
    }

    /// Whether the marker is showing
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.handle.is_some()
    }

    /// The live handle, if any
    #[must_use]
    pub fn handle(&self) -> Option<&TypingHandle> {
        self.handle.as_ref()
    }
}

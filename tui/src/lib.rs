//! Databot TUI - Terminal client for the databot assistant
//!
//! A full-screen chat view over a databot session. The conversation rules
//! live in `databot-core`; this crate only draws what the engine tells it.
//!
//! # Architecture
//!
//! - **Display**: `DisplayState`, the engine's presentation surface
//! - **Widgets**: Rich text layout and a borderless scrollable text block
//! - **App**: Terminal event loop and frame rendering

pub mod app;
pub mod display;
pub mod greeting;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use display::{DisplayRole, DisplayState};

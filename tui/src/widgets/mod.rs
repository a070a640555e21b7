//! Widgets

pub mod rich_text;
pub mod text_block;

pub use rich_text::{render_lines, render_literal, sanitize};
pub use text_block::{TextBlock, TextBlockState};

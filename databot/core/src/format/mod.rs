//! Text Formatter
//!
//! Turns raw assistant text written in a small markdown subset into a
//! sequence of [`RichTextNode`]s. Rendering is a separate concern; see
//! [`crate::render`].
//!
//! Recognized syntax, applied in this order:
//!
//! | Stage        | Syntax             | Node                |
//! |--------------|--------------------|---------------------|
//! | bold         | `**x**`            | `Bold`              |
//! | italic       | `*x*`              | `Italic`            |
//! | code block   | ```` ```x``` ````  | `CodeBlock`         |
//! | inline code  | `` `x` ``          | `InlineCode`        |
//! | headers      | `# x` .. `### x`   | `Header`            |
//! | links        | `[label](url)`     | `Link`              |
//! | lists        | `* x` / `- x`      | `List` / `ListItem` |
//! | line breaks  | newline            | `LineBreak`         |
//!
//! Emphasis delimiters inside code spans are left alone, and code contents
//! are never reinterpreted by later stages. Unmatched delimiters stay as
//! literal text. The formatter is total: any input yields a node sequence.

mod node;
mod scan;
mod stages;

pub use node::{HeaderLevel, RichTextNode};

use stages::PIPELINE;

/// Format raw assistant text into rich text nodes
///
/// Line endings are normalized to `\n` first. The output never contains
/// adjacent `Text` nodes or empty `Text` nodes.
#[must_use]
pub fn format(raw: &str) -> Vec<RichTextNode> {
    let normalized = raw.replace("\r\n", "\n");
    let mut nodes = vec![RichTextNode::Text(normalized)];
    nodes.retain(|n| !matches!(n, RichTextNode::Text(s) if s.is_empty()));

    for (name, stage) in PIPELINE {
        nodes = stage(nodes);
        tracing::trace!(stage = name, nodes = nodes.len(), "format stage applied");
    }

    nodes
}

//! Renderers for rich text nodes
//!
//! Surfaces never interpret assistant text as markup. They either render
//! the node tree natively (the TUI) or go through one of these renderers,
//! which escape every literal and validate every link target.

mod html;
mod link;

pub use html::render_html;
pub use link::safe_link_target;

use crate::format::RichTextNode;

/// Bullet used for list items in plain output
pub const PLAIN_BULLET: &str = "• ";

fn plain_nodes(out: &mut String, nodes: &[RichTextNode]) {
    for node in nodes {
        plain_node(out, node);
    }
}

fn ensure_line_start(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn plain_node(out: &mut String, node: &RichTextNode) {
    match node {
        RichTextNode::Text(s) | RichTextNode::InlineCode(s) | RichTextNode::CodeBlock(s) => {
            out.push_str(s);
        }
        RichTextNode::Paragraph(c)
        | RichTextNode::Bold(c)
        | RichTextNode::Italic(c)
        | RichTextNode::Header { children: c, .. } => plain_nodes(out, c),
        RichTextNode::Link { label, url } => match safe_link_target(url) {
            Some(target) => {
                out.push_str(label);
                out.push_str(" (");
                out.push_str(target.as_str());
                out.push(')');
            }
            None => out.push_str(label),
        },
        RichTextNode::List(items) => {
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    ensure_line_start(out);
                }
                plain_node(out, item);
            }
        }
        RichTextNode::ListItem(c) => {
            out.push_str(PLAIN_BULLET);
            plain_nodes(out, c);
        }
        RichTextNode::LineBreak => out.push('\n'),
    }
}

/// Render nodes as markup-free text
///
/// Used for logs, clipboard copies and surfaces without styling. List
/// items get a bullet each, links show their target when it is safe.
#[must_use]
pub fn render_plain(nodes: &[RichTextNode]) -> String {
    let mut out = String::new();
    plain_nodes(&mut out, nodes);
    out
}

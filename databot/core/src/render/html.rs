//! HTML rendering for web surfaces

use std::fmt::Write;

use super::link::safe_link_target;
use crate::format::RichTextNode;

/// Escape text for use in HTML content and attribute values
fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
}

fn wrap(out: &mut String, tag: &str, children: &[RichTextNode]) {
    let _ = write!(out, "<{tag}>");
    render_nodes(out, children);
    let _ = write!(out, "</{tag}>");
}

fn render_nodes(out: &mut String, nodes: &[RichTextNode]) {
    for node in nodes {
        render_node(out, node);
    }
}

fn render_node(out: &mut String, node: &RichTextNode) {
    match node {
        RichTextNode::Text(s) => escape_into(out, s),
        RichTextNode::Paragraph(c) => wrap(out, "p", c),
        RichTextNode::Bold(c) => wrap(out, "strong", c),
        RichTextNode::Italic(c) => wrap(out, "em", c),
        RichTextNode::InlineCode(s) => {
            out.push_str("<code>");
            escape_into(out, s);
            out.push_str("</code>");
        }
        RichTextNode::CodeBlock(s) => {
            out.push_str("<pre><code>");
            escape_into(out, s);
            out.push_str("</code></pre>");
        }
        RichTextNode::Header { level, children } => {
            wrap(out, &format!("h{}", level.as_u8()), children);
        }
        RichTextNode::Link { label, url } => match safe_link_target(url) {
            Some(target) => {
                out.push_str("<a href=\"");
                escape_into(out, target.as_str());
                out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
                escape_into(out, label);
                out.push_str("</a>");
            }
            None => escape_into(out, label),
        },
        RichTextNode::ListItem(c) => wrap(out, "li", c),
        RichTextNode::List(c) => wrap(out, "ul", c),
        RichTextNode::LineBreak => out.push_str("<br>"),
    }
}

/// Render nodes as an HTML fragment
///
/// All literal text is escaped. Link targets that fail
/// [`safe_link_target`] are dropped and only their label is kept.
#[must_use]
pub fn render_html(nodes: &[RichTextNode]) -> String {
    let mut out = String::new();
    render_nodes(&mut out, nodes);
    out
}

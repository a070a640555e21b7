//! Rich text node types produced by the formatter.

use serde::{Deserialize, Serialize};

/// Header depth. Only the first three levels are recognized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeaderLevel {
    /// `#`
    H1,
    /// `##`
    H2,
    /// `###`
    H3,
}

impl HeaderLevel {
    /// Level for a run of `#` markers, if it is a recognized depth
    #[must_use]
    pub fn from_marks(count: usize) -> Option<Self> {
        match count {
            1 => Some(Self::H1),
            2 => Some(Self::H2),
            3 => Some(Self::H3),
            _ => None,
        }
    }

    /// Numeric level (1-3)
    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            Self::H1 => 1,
            Self::H2 => 2,
            Self::H3 => 3,
        }
    }
}

/// A structured unit of formatted assistant output
///
/// Literal text is carried unescaped in [`RichTextNode::Text`], and link
/// targets in [`RichTextNode::Link`] are untrusted. Renderers are responsible
/// for escaping and for validating link targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RichTextNode {
    /// Literal text
    Text(String),
    /// Paragraph block
    Paragraph(Vec<RichTextNode>),
    /// Strong emphasis
    Bold(Vec<RichTextNode>),
    /// Emphasis
    Italic(Vec<RichTextNode>),
    /// Inline code, verbatim
    InlineCode(String),
    /// Fenced code block, verbatim
    CodeBlock(String),
    /// Header line
    Header {
        /// Header depth
        level: HeaderLevel,
        /// Header content
        children: Vec<RichTextNode>,
    },
    /// Hyperlink with an untrusted target
    Link {
        /// Visible label
        label: String,
        /// Target as written by the assistant
        url: String,
    },
    /// One entry of a list
    ListItem(Vec<RichTextNode>),
    /// A contiguous run of list items
    List(Vec<RichTextNode>),
    /// Explicit line break
    LineBreak,
}

impl RichTextNode {
    /// Convenience constructor for literal text
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Child nodes, for container variants
    #[must_use]
    pub fn children(&self) -> Option<&[RichTextNode]> {
        match self {
            Self::Paragraph(c)
            | Self::Bold(c)
            | Self::Italic(c)
            | Self::ListItem(c)
            | Self::List(c)
            | Self::Header { children: c, .. } => Some(c),
            Self::Text(_)
            | Self::InlineCode(_)
            | Self::CodeBlock(_)
            | Self::Link { .. }
            | Self::LineBreak => None,
        }
    }
}

/// Append literal text, merging with a trailing text node and skipping empties
pub(crate) fn push_text(out: &mut Vec<RichTextNode>, s: &str) {
    if s.is_empty() {
        return;
    }
    if let Some(RichTextNode::Text(last)) = out.last_mut() {
        last.push_str(s);
    } else {
        out.push(RichTextNode::Text(s.to_string()));
    }
}

/// Append any node, keeping adjacent text merged
pub(crate) fn push_node(out: &mut Vec<RichTextNode>, node: RichTextNode) {
    match node {
        RichTextNode::Text(s) => push_text(out, &s),
        other => out.push(other),
    }
}

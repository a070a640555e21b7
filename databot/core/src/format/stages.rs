//! Formatting stages
//!
//! Each stage takes a node sequence and returns a new one. Inline stages
//! only rewrite `Text` leaves (descending into container nodes); line stages
//! work on the top-level sequence split at newlines. Code and link contents
//! are never revisited.

use super::node::{push_node, push_text, HeaderLevel, RichTextNode};
use super::scan::{code_regions, region_at, CodeKind, CodeRegion};

/// A single transformation over a node sequence
pub(crate) type Stage = fn(Vec<RichTextNode>) -> Vec<RichTextNode>;

/// Stages in application order
pub(crate) const PIPELINE: [(&str, Stage); 8] = [
    ("bold", bold),
    ("italic", italic),
    ("code_block", code_block),
    ("inline_code", inline_code),
    ("headers", headers),
    ("links", links),
    ("lists", lists),
    ("line_breaks", line_breaks),
];

// ============================================================================
// Traversal helpers
// ============================================================================

/// Rewrite every text leaf with `f`, descending into containers
fn map_text(nodes: Vec<RichTextNode>, f: &dyn Fn(&str) -> Vec<RichTextNode>) -> Vec<RichTextNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        let mapped = match node {
            RichTextNode::Text(s) => {
                for piece in f(&s) {
                    push_node(&mut out, piece);
                }
                continue;
            }
            RichTextNode::Paragraph(c) => RichTextNode::Paragraph(map_text(c, f)),
            RichTextNode::Bold(c) => RichTextNode::Bold(map_text(c, f)),
            RichTextNode::Italic(c) => RichTextNode::Italic(map_text(c, f)),
            RichTextNode::ListItem(c) => RichTextNode::ListItem(map_text(c, f)),
            RichTextNode::List(c) => RichTextNode::List(map_text(c, f)),
            RichTextNode::Header { level, children } => RichTextNode::Header {
                level,
                children: map_text(children, f),
            },
            leaf @ (RichTextNode::InlineCode(_)
            | RichTextNode::CodeBlock(_)
            | RichTextNode::Link { .. }
            | RichTextNode::LineBreak) => leaf,
        };
        out.push(mapped);
    }
    out
}

/// Split a top-level sequence into lines at every newline in text nodes
fn split_lines(nodes: Vec<RichTextNode>) -> Vec<Vec<RichTextNode>> {
    let mut lines = vec![Vec::new()];
    for node in nodes {
        match node {
            RichTextNode::Text(s) => {
                let mut pieces = s.split('\n');
                if let Some(first) = pieces.next() {
                    if let Some(line) = lines.last_mut() {
                        push_text(line, first);
                    }
                }
                for piece in pieces {
                    let mut line = Vec::new();
                    push_text(&mut line, piece);
                    lines.push(line);
                }
            }
            other => {
                if let Some(line) = lines.last_mut() {
                    line.push(other);
                }
            }
        }
    }
    lines
}

/// Inverse of [`split_lines`]
fn join_lines(lines: Vec<Vec<RichTextNode>>) -> Vec<RichTextNode> {
    let mut out = Vec::new();
    for (idx, line) in lines.into_iter().enumerate() {
        if idx > 0 {
            push_text(&mut out, "\n");
        }
        for node in line {
            push_node(&mut out, node);
        }
    }
    out
}

fn char_before(text: &str, pos: usize) -> Option<char> {
    text[..pos].chars().next_back()
}

fn char_after(text: &str, pos: usize) -> Option<char> {
    text[pos..].chars().next()
}

// ============================================================================
// Emphasis
// ============================================================================

/// Delimiter rules for one emphasis kind
struct Emphasis {
    delim: &'static str,
    /// Single-character delimiters must not touch another `*`
    isolated: bool,
    wrap: fn(Vec<RichTextNode>) -> RichTextNode,
}

impl Emphasis {
    fn touches_star(&self, text: &str, pos: usize) -> bool {
        self.isolated
            && (char_before(text, pos) == Some('*')
                || char_after(text, pos + self.delim.len()) == Some('*'))
    }

    fn is_opener(&self, text: &str, pos: usize) -> bool {
        let next = char_after(text, pos + self.delim.len());
        matches!(next, Some(c) if !c.is_whitespace()) && !self.touches_star(text, pos)
    }

    fn is_closer(&self, text: &str, pos: usize) -> bool {
        let prev = char_before(text, pos);
        matches!(prev, Some(c) if !c.is_whitespace()) && !self.touches_star(text, pos)
    }

    /// Nearest valid closing delimiter on the same line, outside code
    fn find_closer(&self, text: &str, from: usize, regions: &[CodeRegion]) -> Option<usize> {
        let mut j = from;
        while let Some(rel) = text[j..].find(self.delim) {
            let candidate = j + rel;
            if text[from..candidate].contains('\n') {
                return None;
            }
            if let Some(region) = region_at(regions, candidate) {
                j = region.outer.end;
                continue;
            }
            if candidate > from && self.is_closer(text, candidate) {
                return Some(candidate);
            }
            j = candidate + 1;
        }
        None
    }

    fn apply(&self, text: &str) -> Vec<RichTextNode> {
        let regions = code_regions(text);
        let mut out = Vec::new();
        let mut last = 0;
        let mut i = 0;

        while let Some(rel) = text[i..].find(self.delim) {
            let open = i + rel;
            if let Some(region) = region_at(&regions, open) {
                i = region.outer.end;
                continue;
            }
            if !self.is_opener(text, open) {
                i = open + self.delim.len();
                continue;
            }
            let content_start = open + self.delim.len();
            match self.find_closer(text, content_start, &regions) {
                Some(close) => {
                    push_text(&mut out, &text[last..open]);
                    out.push((self.wrap)(vec![RichTextNode::text(&text[content_start..close])]));
                    last = close + self.delim.len();
                    i = last;
                }
                None => i = content_start,
            }
        }

        push_text(&mut out, &text[last..]);
        out
    }
}

const BOLD: Emphasis = Emphasis {
    delim: "**",
    isolated: false,
    wrap: RichTextNode::Bold,
};

const ITALIC: Emphasis = Emphasis {
    delim: "*",
    isolated: true,
    wrap: RichTextNode::Italic,
};

/// `**x**` → Bold
pub(crate) fn bold(nodes: Vec<RichTextNode>) -> Vec<RichTextNode> {
    map_text(nodes, &|s: &str| BOLD.apply(s))
}

/// `*x*` → Italic
pub(crate) fn italic(nodes: Vec<RichTextNode>) -> Vec<RichTextNode> {
    map_text(nodes, &|s: &str| ITALIC.apply(s))
}

// ============================================================================
// Code
// ============================================================================

fn extract_code(text: &str, kind: CodeKind) -> Vec<RichTextNode> {
    let mut out = Vec::new();
    let mut last = 0;
    for region in code_regions(text).into_iter().filter(|r| r.kind == kind) {
        push_text(&mut out, &text[last..region.outer.start]);
        let contents = text[region.inner].to_string();
        out.push(match kind {
            CodeKind::Fenced => RichTextNode::CodeBlock(contents),
            CodeKind::Inline => RichTextNode::InlineCode(contents),
        });
        last = region.outer.end;
    }
    push_text(&mut out, &text[last..]);
    out
}

/// ```` ```x``` ```` → `CodeBlock`
pub(crate) fn code_block(nodes: Vec<RichTextNode>) -> Vec<RichTextNode> {
    map_text(nodes, &|s: &str| extract_code(s, CodeKind::Fenced))
}

/// `` `x` `` → `InlineCode`
pub(crate) fn inline_code(nodes: Vec<RichTextNode>) -> Vec<RichTextNode> {
    map_text(nodes, &|s: &str| extract_code(s, CodeKind::Inline))
}

// ============================================================================
// Line-level stages
// ============================================================================

/// Leading text of a line, if the line starts with text
fn leading_text(line: &[RichTextNode]) -> Option<&str> {
    match line.first() {
        Some(RichTextNode::Text(s)) => Some(s),
        _ => None,
    }
}

/// Replace the leading text of a line with `rest`, dropping it if empty
fn with_leading_text(mut line: Vec<RichTextNode>, rest: &str) -> Vec<RichTextNode> {
    if line.is_empty() {
        return line;
    }
    line.remove(0);
    let mut out = Vec::with_capacity(line.len() + 1);
    push_text(&mut out, rest);
    out.extend(line);
    out
}

/// Header marker: 1-3 `#` then a space, at the start of the line
fn header_marker(line: &[RichTextNode]) -> Option<(HeaderLevel, usize)> {
    let text = leading_text(line)?;
    let marks = text.bytes().take_while(|b| *b == b'#').count();
    let level = HeaderLevel::from_marks(marks)?;
    if !text[marks..].starts_with(' ') {
        return None;
    }
    let consumed = text.len() - text[marks..].trim_start_matches(' ').len();
    Some((level, consumed))
}

/// `# Title` → Header
pub(crate) fn headers(nodes: Vec<RichTextNode>) -> Vec<RichTextNode> {
    let lines = split_lines(nodes)
        .into_iter()
        .map(|line| match header_marker(&line) {
            Some((level, consumed)) => {
                let rest = leading_text(&line).map(|t| t[consumed..].to_string()).unwrap_or_default();
                vec![RichTextNode::Header {
                    level,
                    children: with_leading_text(line, &rest),
                }]
            }
            None => line,
        })
        .collect();
    join_lines(lines)
}

/// List marker: `*` or `-` then whitespace, at the start of the line
fn list_marker(line: &[RichTextNode]) -> Option<usize> {
    let text = leading_text(line)?;
    let mut chars = text.chars();
    if !matches!(chars.next(), Some('*' | '-')) {
        return None;
    }
    if !matches!(chars.next(), Some(c) if c.is_whitespace()) {
        return None;
    }
    Some(text.len() - text[1..].trim_start().len())
}

/// `* item` / `- item` → `ListItem`, contiguous runs grouped into a List
pub(crate) fn lists(nodes: Vec<RichTextNode>) -> Vec<RichTextNode> {
    let mut units: Vec<Vec<RichTextNode>> = Vec::new();
    let mut run: Vec<RichTextNode> = Vec::new();

    for line in split_lines(nodes) {
        match list_marker(&line) {
            Some(consumed) => {
                let rest = leading_text(&line).map(|t| t[consumed..].to_string()).unwrap_or_default();
                run.push(RichTextNode::ListItem(with_leading_text(line, &rest)));
            }
            None => {
                if !run.is_empty() {
                    units.push(vec![RichTextNode::List(std::mem::take(&mut run))]);
                }
                units.push(line);
            }
        }
    }
    if !run.is_empty() {
        units.push(vec![RichTextNode::List(run)]);
    }

    join_lines(units)
}

// ============================================================================
// Links
// ============================================================================

/// Parse `[label](url)` starting at `open` (a `[`). Returns label, url and
/// the end offset.
fn parse_link(text: &str, open: usize) -> Option<(&str, &str, usize)> {
    let label_start = open + 1;
    let label_end = label_start + text[label_start..].find(']')?;
    let label = &text[label_start..label_end];
    if label.is_empty() || label.contains(['[', '\n']) {
        return None;
    }
    let url_start = label_end + 2;
    if !text[label_end + 1..].starts_with('(') {
        return None;
    }
    let url_end = url_start + text[url_start..].find(')')?;
    let url = &text[url_start..url_end];
    if url.is_empty() || url.contains(char::is_whitespace) {
        return None;
    }
    Some((label, url, url_end + 1))
}

fn extract_links(text: &str) -> Vec<RichTextNode> {
    let mut out = Vec::new();
    let mut last = 0;
    let mut i = 0;
    while let Some(rel) = text[i..].find('[') {
        let open = i + rel;
        match parse_link(text, open) {
            Some((label, url, end)) => {
                push_text(&mut out, &text[last..open]);
                out.push(RichTextNode::Link {
                    label: label.to_string(),
                    url: url.to_string(),
                });
                last = end;
                i = end;
            }
            None => i = open + 1,
        }
    }
    push_text(&mut out, &text[last..]);
    out
}

/// `[label](url)` → Link
pub(crate) fn links(nodes: Vec<RichTextNode>) -> Vec<RichTextNode> {
    map_text(nodes, &extract_links)
}

// ============================================================================
// Line breaks
// ============================================================================

fn split_breaks(text: &str) -> Vec<RichTextNode> {
    let mut out = Vec::new();
    for (idx, piece) in text.split('\n').enumerate() {
        if idx > 0 {
            out.push(RichTextNode::LineBreak);
        }
        push_text(&mut out, piece);
    }
    out
}

/// Remaining `\n` → `LineBreak`
pub(crate) fn line_breaks(nodes: Vec<RichTextNode>) -> Vec<RichTextNode> {
    map_text(nodes, &split_breaks)
}

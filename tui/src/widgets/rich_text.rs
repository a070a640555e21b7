//! Rich text to terminal lines
//!
//! Lays out formatter output as styled, width-wrapped ratatui lines. Every
//! literal is stripped of control characters first, so assistant or user
//! text can never inject terminal escape sequences.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use textwrap::core::{break_words, Fragment};
use textwrap::wrap_algorithms::wrap_first_fit;
use textwrap::WordSeparator;
use unicode_width::UnicodeWidthStr;

use databot_core::{safe_link_target, RichTextNode};

use crate::theme;

/// Bullet for list items
const BULLET: &str = "• ";

/// Indent for code block lines
const CODE_INDENT: &str = "  ";

/// Remove control characters; tabs become a space
#[must_use]
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\t' { ' ' } else { c })
        .filter(|c| !c.is_control())
        .collect()
}

/// A styled run of text within one logical line
type Segment = (String, Style);

/// Collects logical (unwrapped) lines while walking the node tree
#[derive(Default)]
struct Layout {
    lines: Vec<Vec<Segment>>,
    current: Vec<Segment>,
    /// The last line was ended by a block element
    after_block: bool,
}

impl Layout {
    fn push(&mut self, text: &str, style: Style) {
        let clean = sanitize(text);
        if clean.is_empty() {
            return;
        }
        self.after_block = false;
        self.current.push((clean, style));
    }

    /// End the current line if it has content
    fn end_block(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
        self.after_block = true;
    }

    /// An explicit break; the first one right after a block is absorbed
    fn line_break(&mut self) {
        if self.current.is_empty() && self.after_block {
            self.after_block = false;
            return;
        }
        self.lines.push(std::mem::take(&mut self.current));
    }

    fn finish(mut self) -> Vec<Vec<Segment>> {
        if !self.current.is_empty() {
            self.lines.push(self.current);
        }
        self.lines
    }

    fn nodes(&mut self, nodes: &[RichTextNode], style: Style) {
        for node in nodes {
            self.node(node, style);
        }
    }

    fn node(&mut self, node: &RichTextNode, style: Style) {
        match node {
            RichTextNode::Text(text) => self.push(text, style),
            RichTextNode::Bold(children) => {
                self.nodes(children, style.add_modifier(Modifier::BOLD));
            }
            RichTextNode::Italic(children) => {
                self.nodes(children, style.add_modifier(Modifier::ITALIC));
            }
            RichTextNode::InlineCode(code) => self.push(code, theme::code_style()),
            RichTextNode::CodeBlock(code) => {
                self.end_block();
                for line in code.trim_matches('\n').split('\n') {
                    self.current.push((CODE_INDENT.to_string(), Style::default()));
                    self.push(line, theme::code_style());
                    self.lines.push(std::mem::take(&mut self.current));
                }
                self.after_block = true;
            }
            RichTextNode::Header { level, children } => {
                self.end_block();
                self.nodes(children, theme::header_style(*level));
                self.end_block();
            }
            RichTextNode::Link { label, url } => match safe_link_target(url) {
                Some(target) => {
                    self.push(label, theme::link_style());
                    self.push(&format!(" ({target})"), Style::default().fg(theme::DIM_GRAY));
                }
                None => self.push(label, style),
            },
            RichTextNode::List(items) => {
                self.end_block();
                self.nodes(items, style);
                self.end_block();
            }
            RichTextNode::ListItem(children) => {
                self.end_block();
                self.push(BULLET, style);
                self.nodes(children, style);
                self.end_block();
            }
            RichTextNode::Paragraph(children) => {
                self.end_block();
                self.nodes(children, style);
                self.end_block();
            }
            RichTextNode::LineBreak => self.line_break(),
        }
    }
}

/// A word and its trailing whitespace, styled like the run it came from
#[derive(Debug)]
struct StyledWord {
    word: String,
    whitespace: String,
    style: Style,
}

impl Fragment for StyledWord {
    fn width(&self) -> f64 {
        self.word.width() as f64
    }

    fn whitespace_width(&self) -> f64 {
        self.whitespace.width() as f64
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

/// Split styled runs into words, breaking any word wider than `width`
fn styled_words(segments: &[Segment], width: usize) -> Vec<StyledWord> {
    let mut out = Vec::new();
    for (text, style) in segments {
        let words = WordSeparator::AsciiSpace.find_words(text);
        out.extend(break_words(words, width).into_iter().map(|w| StyledWord {
            word: w.word.to_string(),
            whitespace: w.whitespace.to_string(),
            style: *style,
        }));
    }
    out
}

fn push_text(spans: &mut Vec<Span<'static>>, text: &str, style: Style) {
    if text.is_empty() {
        return;
    }
    match spans.last_mut() {
        Some(last) if last.style == style => {
            let mut joined = last.content.to_string();
            joined.push_str(text);
            *last = Span::styled(joined, style);
        }
        _ => spans.push(Span::styled(text.to_string(), style)),
    }
}

/// One wrapped line; continuation lines drop leading whitespace
fn styled_line(words: &[StyledWord], continuation: bool) -> Line<'static> {
    let skip = if continuation {
        words.iter().take_while(|w| w.word.is_empty()).count()
    } else {
        0
    };
    let words = &words[skip..];

    let mut spans = Vec::new();
    for (idx, w) in words.iter().enumerate() {
        push_text(&mut spans, &w.word, w.style);
        if idx + 1 < words.len() {
            push_text(&mut spans, &w.whitespace, w.style);
        }
    }

    // No trailing whitespace at a wrap point
    while let Some(last) = spans.last_mut() {
        let trimmed = last.content.trim_end().to_string();
        if trimmed.is_empty() {
            spans.pop();
            continue;
        }
        if trimmed.len() != last.content.len() {
            *last = Span::styled(trimmed, last.style);
        }
        break;
    }
    Line::from(spans)
}

/// Wrap one logical line into `out`
fn wrap_segments(segments: &[Segment], width: usize, out: &mut Vec<Line<'static>>) {
    let width = width.max(1);
    let words = styled_words(segments, width);
    for (idx, line) in wrap_first_fit(&words, &[width as f64]).into_iter().enumerate() {
        out.push(styled_line(line, idx > 0));
    }
}

/// Lay out nodes as wrapped, styled lines
///
/// `prefix` is placed at the start of the first line (for the role label).
#[must_use]
pub fn render_lines(
    nodes: &[RichTextNode],
    prefix: Option<Segment>,
    base: Style,
    width: usize,
) -> Vec<Line<'static>> {
    let mut layout = Layout::default();
    if let Some((text, style)) = prefix {
        layout.push(&text, style);
        layout.after_block = false;
    }
    layout.nodes(nodes, base);

    let mut lines = Vec::new();
    for line in layout.finish() {
        wrap_segments(&line, width, &mut lines);
    }
    lines
}

/// Lay out literal text (user input, notices) without interpreting it
#[must_use]
pub fn render_literal(
    text: &str,
    prefix: Option<Segment>,
    style: Style,
    width: usize,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (idx, line) in text.split('\n').enumerate() {
        let mut segments = Vec::new();
        if idx == 0 {
            if let Some((p, s)) = &prefix {
                segments.push((p.clone(), *s));
            }
        }
        segments.push((sanitize(line), style));
        wrap_segments(&segments, width, &mut lines);
    }
    lines
}

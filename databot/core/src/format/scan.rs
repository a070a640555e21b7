//! Code region scanning shared by the emphasis and code stages.
//!
//! All offsets are byte offsets. Every boundary sits next to an ASCII
//! backtick, so slicing at them is always on a char boundary.

use std::ops::Range;

const FENCE: &str = "```";

/// Kind of code region
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CodeKind {
    /// Triple-backtick block (may span lines)
    Fenced,
    /// Single-backtick span (one line, non-empty)
    Inline,
}

/// A code region found in a piece of text
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CodeRegion {
    pub kind: CodeKind,
    /// Whole region including delimiters
    pub outer: Range<usize>,
    /// Contents between delimiters
    pub inner: Range<usize>,
}

/// Find code regions left to right. Fences take precedence over single
/// backticks at the same position; an unclosed fence is not a region.
pub(crate) fn code_regions(text: &str) -> Vec<CodeRegion> {
    let bytes = text.as_bytes();
    let mut regions = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }

        if text[i..].starts_with(FENCE) {
            if let Some(rel) = text[i + FENCE.len()..].find(FENCE) {
                let close = i + FENCE.len() + rel;
                regions.push(CodeRegion {
                    kind: CodeKind::Fenced,
                    outer: i..close + FENCE.len(),
                    inner: i + FENCE.len()..close,
                });
                i = close + FENCE.len();
                continue;
            }
        }

        let rest = &text[i + 1..];
        match rest.find(['`', '\n']) {
            Some(rel) if rel > 0 && rest.as_bytes()[rel] == b'`' => {
                let close = i + 1 + rel;
                regions.push(CodeRegion {
                    kind: CodeKind::Inline,
                    outer: i..close + 1,
                    inner: i + 1..close,
                });
                i = close + 1;
            }
            _ => i += 1,
        }
    }

    regions
}

/// The region containing `pos`, if any
pub(crate) fn region_at(regions: &[CodeRegion], pos: usize) -> Option<&CodeRegion> {
    regions.iter().find(|r| r.outer.contains(&pos))
}

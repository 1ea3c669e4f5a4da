//! Code-span segmentation shared by the scanner and the rewriter.
//!
//! Fenced blocks are located first over the whole document. Inline spans are
//! then located inside the gaps between fenced blocks, so a backtick that
//! belongs to a fence can never open an inline span.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::Segment;

/// Triple-backtick block, non-greedy up to the next triple backtick.
static FENCED_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"(?s)```.*?```").expect("valid fenced code regex"));

/// Single-backtick span on one line with no backtick inside.
static INLINE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"`[^`\n]+`").expect("valid inline code regex"));

/// Push a non-empty slice of `document` as the given kind of segment.
fn push_segment<'a>(
    segments: &mut Vec<Segment<'a>>,
    document: &'a str,
    start: usize,
    end: usize,
    code: bool,
) {
    let Some(text) = document.get(start..end) else { return };
    if text.is_empty() {
        return;
    }
    if code {
        segments.push(Segment::Code(text));
    } else {
        segments.push(Segment::Prose(text));
    }
}

/// Split the gap `start..end` between fenced blocks into inline code and prose.
fn segment_gap<'a>(segments: &mut Vec<Segment<'a>>, document: &'a str, start: usize, end: usize) {
    let Some(gap) = document.get(start..end) else { return };
    let mut cursor = start;
    for span in INLINE_CODE_RE.find_iter(gap) {
        let span_start = start.saturating_add(span.start());
        let span_end = start.saturating_add(span.end());
        push_segment(segments, document, cursor, span_start, false);
        push_segment(segments, document, span_start, span_end, true);
        cursor = span_end;
    }
    push_segment(segments, document, cursor, end, false);
}

/// Partition `document` into code and prose segments, in document order.
///
/// # Panics
///
/// Panics if a hardcoded code-span regex is invalid (compile-time invariant).
pub fn segment(document: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut cursor = 0_usize;

    for block in FENCED_CODE_RE.find_iter(document) {
        segment_gap(&mut segments, document, cursor, block.start());
        push_segment(&mut segments, document, block.start(), block.end(), true);
        cursor = block.end();
    }
    segment_gap(&mut segments, document, cursor, document.len());

    return segments;
}

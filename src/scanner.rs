use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use walkdir::WalkDir;

use crate::error::Error;
use crate::segment;
use crate::types::{Reference, Segment};

/// `[[target]]` or `[[target|alias]]`. Target stops at the first `]` or `|`.
pub(crate) static WIKILINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"\[\[([^\]|]+)(?:\|([^\]]+))?\]\]").expect("valid wikilink regex");
});

/// Extract every reference that lives in prose, in document order.
/// Fenced blocks and inline code spans are skipped.
pub fn scan(document: &str) -> Vec<Reference> {
    let mut references = Vec::new();
    let mut offset = 0_usize;

    for piece in segment::segment(document) {
        if let Segment::Prose(text) = piece {
            extract_references_from_prose(text, offset, &mut references);
        }
        offset = offset.saturating_add(piece.text().len());
    }

    return references;
}

/// Scan one markdown file, or every markdown file under a directory.
/// Hidden directories (`.obsidian`, `.git`, ...) are not descended into.
/// Returns `(relative path, references)` pairs sorted by path; files without
/// references are omitted.
///
/// # Errors
///
/// Returns `Error::ReadFailure` if any markdown file cannot be read.
pub fn scan_path(root: &Path) -> Result<Vec<(PathBuf, Vec<Reference>)>, Error> {
    if !root.is_dir() {
        let content = read_document(root)?;
        let references = scan(&content);
        return Ok(vec![(root.to_path_buf(), references)]);
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| return e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        .filter_map(Result::ok)
        .filter(|e| return e.path().extension().is_some_and(|ext| return ext == "md"))
    {
        let md_path = entry.path();
        let content = read_document(md_path)?;
        let references = scan(&content);
        if references.is_empty() {
            continue;
        }
        let relative = md_path.strip_prefix(root).unwrap_or(md_path).to_path_buf();
        found.push((relative, references));
    }

    return Ok(found);
}

/// Read a document as UTF-8 text.
///
/// # Errors
///
/// Returns `Error::ReadFailure` carrying the path and the I/O cause.
pub fn read_document(path: &Path) -> Result<String, Error> {
    return std::fs::read_to_string(path).map_err(|source| {
        return Error::ReadFailure {
            path: path.to_path_buf(),
            source,
        };
    });
}

/// Collect references from one prose segment starting at byte `base`.
fn extract_references_from_prose(prose: &str, base: usize, references: &mut Vec<Reference>) {
    for cap in WIKILINK_RE.captures_iter(prose) {
        let Some(reference) = parse_wikilink_capture(&cap, base) else {
            continue;
        };
        references.push(reference);
    }
}

/// Turn a regex capture into a reference. Returns `None` when the target is
/// blank after trimming.
pub(crate) fn parse_wikilink_capture(cap: &Captures<'_>, base: usize) -> Option<Reference> {
    let whole = cap.get(0)?;
    let target = cap.get(1)?.as_str().trim();
    if target.is_empty() {
        return None;
    }

    return Some(Reference {
        alias: cap.get(2).map(|m| return m.as_str().to_string()),
        full_match: whole.as_str().to_string(),
        offset: base.saturating_add(whole.start()),
        target: target.to_string(),
    });
}

//! Reverse transform: portable hyperlinks back into wiki references.
//!
//! Works on the whole text with no code-span exclusion. Only links whose
//! destination carries an `http://` or `https://` scheme and ends in `.md`
//! are touched; everything else passes through.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `[display](http(s)://....md)`; the `.md` suffix is outside the capture.
/// Display text may not contain brackets, so a stray `[` earlier in the
/// line is never absorbed into it. A `[` inside rewritten display text
/// therefore only yields its tail, e.g. `[a[b](…)` reverts to `[a[[a[b|b]]`.
static HYPERLINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"\[([^\[\]]+)\]\((https?://[^)]*)\.md\)").expect("valid hyperlink regex");
});

/// Restore `[[target]]` / `[[target|display]]` from rewritten hyperlinks.
pub fn revert(rewritten: &str) -> String {
    let mut restored = 0_usize;
    let out = HYPERLINK_RE.replace_all(rewritten, |cap: &Captures<'_>| {
        return match restore_wikilink(&cap[1], &cap[2]) {
            Some(wikilink) => {
                restored = restored.saturating_add(1);
                wikilink
            },
            None => cap[0].to_string(),
        };
    });

    tracing::debug!(restored, "reverted hyperlinks");
    return out.into_owned();
}

/// Recover the note name from a destination: decode it, then keep the last
/// path segment. Returns `None` when decoding fails or nothing is left.
pub fn reconstruct_target(destination: &str) -> Option<String> {
    let decoded = urlencoding::decode(destination).ok()?;
    let target = decoded.rsplit('/').next()?;
    if target.is_empty() {
        return None;
    }
    return Some(target.to_string());
}

/// Build the wiki reference for one matched hyperlink.
fn restore_wikilink(display: &str, destination: &str) -> Option<String> {
    let target = reconstruct_target(destination)?;
    if display == target {
        return Some(format!("[[{target}]]"));
    }
    return Some(format!("[[{target}|{display}]]"));
}

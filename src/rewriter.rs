//! Forward transform: wiki references become portable hyperlinks.

use regex::Captures;

use crate::scanner::{WIKILINK_RE, parse_wikilink_capture};
use crate::segment;
use crate::types::{Reference, Segment};

/// Extension appended to every rewritten link destination.
pub const LINK_EXTENSION: &str = ".md";

/// Build the hyperlink destination for a note target.
pub fn link_destination(url_prefix: &str, target: &str) -> String {
    let encoded = urlencoding::encode(target.trim());
    return format!("{url_prefix}{encoded}{LINK_EXTENSION}");
}

/// Replace every prose reference with `[display](prefix + target + .md)`.
/// Code segments are copied through untouched, so a document without
/// references comes back byte-for-byte identical.
pub fn rewrite(document: &str, url_prefix: &str) -> String {
    let mut out = String::with_capacity(document.len());
    let mut rewritten = 0_usize;

    for piece in segment::segment(document) {
        match piece {
            Segment::Code(text) => out.push_str(text),
            Segment::Prose(text) => {
                let replaced = WIKILINK_RE.replace_all(text, |cap: &Captures<'_>| {
                    return match parse_wikilink_capture(cap, 0) {
                        Some(reference) => {
                            rewritten = rewritten.saturating_add(1);
                            render_hyperlink(&reference, url_prefix)
                        },
                        None => cap[0].to_string(),
                    };
                });
                out.push_str(&replaced);
            },
        }
    }

    tracing::debug!(rewritten, url_prefix, "rewrote wiki references");
    return out;
}

/// Render one reference as a markdown hyperlink.
fn render_hyperlink(reference: &Reference, url_prefix: &str) -> String {
    let destination = link_destination(url_prefix, &reference.target);
    return format!("[{}]({destination})", reference.display_text());
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "https://files.example.com/";

    #[test]
    fn rewrites_plain_reference() {
        assert_eq!(
            rewrite("See [[Project Plan]].", PREFIX),
            "See [Project Plan](https://files.example.com/Project%20Plan.md)."
        );
    }

    #[test]
    fn alias_becomes_display_text() {
        assert_eq!(
            rewrite("[[Note A|Shown]]", PREFIX),
            "[Shown](https://files.example.com/Note%20A.md)"
        );
    }

    #[test]
    fn trims_target_before_encoding() {
        assert_eq!(
            rewrite("[[ Spaced ]]", PREFIX),
            "[Spaced](https://files.example.com/Spaced.md)"
        );
    }

    #[test]
    fn encodes_reserved_characters() {
        assert_eq!(
            rewrite("[[Q&A (draft)]]", PREFIX),
            "[Q&A (draft)](https://files.example.com/Q%26A%20%28draft%29.md)"
        );
    }

    #[test]
    fn encodes_non_ascii_targets() {
        assert_eq!(
            rewrite("[[笔记]]", PREFIX),
            "[笔记](https://files.example.com/%E7%AC%94%E8%AE%B0.md)"
        );
    }

    #[test]
    fn leaves_code_untouched() {
        let doc = "See [[Project Plan]] and `[[literal]]` and ```\n[[in block]]\n```";
        assert_eq!(
            rewrite(doc, PREFIX),
            "See [Project Plan](https://files.example.com/Project%20Plan.md) and `[[literal]]` and ```\n[[in block]]\n```"
        );
    }

    #[test]
    fn document_without_references_is_unchanged() {
        let docs = [
            "",
            "plain text\nwith lines\n",
            "[single](https://example.com/x.md) and [[unterminated",
            "`[[code only]]`\n```\n[[fenced]]\n```",
        ];
        for doc in docs {
            assert_eq!(rewrite(doc, PREFIX), doc);
        }
    }

    #[test]
    fn blank_reference_is_left_alone() {
        assert_eq!(rewrite("[[  ]] [[x]]", PREFIX), "[[  ]] [x](https://files.example.com/x.md)");
    }

    #[test]
    fn prefix_is_used_verbatim() {
        assert_eq!(rewrite("[[a]]", "http://h/dir/"), "[a](http://h/dir/a.md)");
    }
}

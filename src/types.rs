//! Core domain types for wikidav references, segments, and server profiles.

/// A wiki-style cross-reference found in prose by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Reference {
    /// Display text overriding the target, from `[[target|alias]]`.
    pub alias: Option<String>,
    /// The exact original substring, e.g. `[[Note|Shown]]`.
    pub full_match: String,
    /// Byte offset of `full_match` in the scanned document.
    pub offset: usize,
    /// The referenced note name, trimmed of surrounding whitespace.
    pub target: String,
}

impl Reference {
    /// Text shown for the hyperlink: the alias when present, else the target.
    pub fn display_text(&self) -> &str {
        return self.alias.as_deref().unwrap_or(&self.target);
    }
}

/// A contiguous slice of a document. A document's segments partition it
/// exactly, so joining them reproduces the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// A fenced block or inline span. Never scanned or rewritten.
    Code(&'a str),
    /// Ordinary text that may contain references.
    Prose(&'a str),
}

impl<'a> Segment<'a> {
    /// The underlying slice, regardless of tag.
    pub const fn text(&self) -> &'a str {
        return match *self {
            Segment::Code(text) | Segment::Prose(text) => text,
        };
    }
}

/// One configured WebDAV destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct ServerProfile {
    /// Public base URL the uploaded files are reachable under.
    #[serde(default)]
    pub custom_url_prefix: String,
    /// Human-readable label; may be empty.
    #[serde(default)]
    pub name: String,
    /// Obfuscated password, see `credentials`.
    #[serde(default)]
    pub password: String,
    /// Login for basic authentication.
    #[serde(default)]
    pub username: String,
    /// Collection URL files are PUT into.
    #[serde(default)]
    pub webdav_url: String,
}

impl ServerProfile {
    /// Label used in prompts and listings. Unnamed profiles fall back to
    /// their one-based position.
    pub fn label(&self, index: usize) -> String {
        if self.name.trim().is_empty() {
            return format!("Server {}", index.saturating_add(1));
        }
        return self.name.clone();
    }

    /// Names of the fields an upload needs that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.webdav_url.trim().is_empty() {
            missing.push("webdav_url");
        }
        if self.username.trim().is_empty() {
            missing.push("username");
        }
        if self.password.is_empty() {
            missing.push("password");
        }
        return missing;
    }
}

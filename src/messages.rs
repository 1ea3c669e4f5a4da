//! User-facing notices in every supported locale.
//!
//! Templates are resolved from a static `(key, locale)` table; callers pass
//! the locale explicitly. `{0}`, `{1}`, ... are positional placeholders.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Positional placeholder such as `{0}`.
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"\{(\d+)\}").expect("valid placeholder regex");
});

/// Languages notices are available in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    /// English, also the fallback for unknown languages.
    #[default]
    En,
    /// Simplified Chinese.
    Zh,
}

impl Locale {
    /// Parse a language tag leniently: any `zh*` tag selects Chinese,
    /// everything else falls back to English.
    pub fn parse(tag: &str) -> Self {
        let lowered = tag.trim().to_ascii_lowercase();
        if lowered.starts_with("zh") {
            return Self::Zh;
        }
        return Self::En;
    }

    /// Short tag written back to settings and shown by `info`.
    pub const fn tag(self) -> &'static str {
        return match self {
            Self::En => "en",
            Self::Zh => "zh",
        };
    }
}

/// Every notice the tool can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    /// Heading hint shown after the list of references.
    ConsiderUploading,
    /// Heading of the reference list after an upload.
    InternalLinksFound,
    /// The document to upload could not be read.
    NoActiveFile,
    /// The server prompt was cancelled.
    NoServerSelected,
    /// No server profile exists.
    NoServersConfigured,
    /// Reminder that passwords stay local.
    PasswordLocal,
    /// Reverting the uploaded copy did not reproduce the local document.
    RoundTripLossy,
    /// Upload failed; `{0}` is the reason.
    UploadFailure,
    /// Upload succeeded; `{0}` is the public URL.
    UploadSuccess,
    /// Profile check failed; `{0}` is the reason.
    ValidationFailed,
    /// Profile check succeeded.
    ValidationSucceeded,
}

impl MessageKey {
    /// The raw template for this key in `locale`.
    pub const fn template(self, locale: Locale) -> &'static str {
        return match (self, locale) {
            (Self::ConsiderUploading, Locale::En) => {
                "Consider uploading these notes and updating the links in the uploaded file."
            },
            (Self::ConsiderUploading, Locale::Zh) => "考虑上传这些笔记并更新已上传文件中的链接。",
            (Self::InternalLinksFound, Locale::En) => "Internal Links Found",
            (Self::InternalLinksFound, Locale::Zh) => "发现内部链接",
            (Self::NoActiveFile, Locale::En) => "No file to upload: {0}",
            (Self::NoActiveFile, Locale::Zh) => "没有要上传的文件：{0}",
            (Self::NoServerSelected, Locale::En) => "No server selected for upload.",
            (Self::NoServerSelected, Locale::Zh) => "未选择上传的服务器。",
            (Self::NoServersConfigured, Locale::En) => "No WebDAV server configured.",
            (Self::NoServersConfigured, Locale::Zh) => "未配置 WebDAV 服务器。",
            (Self::PasswordLocal, Locale::En) => {
                "Your password is stored only in the local settings file and is merely obfuscated, not encrypted."
            },
            (Self::PasswordLocal, Locale::Zh) => "您的密码仅保存在本地设置文件中，只做了混淆处理，并未加密。",
            (Self::RoundTripLossy, Locale::En) => {
                "The uploaded copy does not convert back to the local note exactly; the local note was left unchanged."
            },
            (Self::RoundTripLossy, Locale::Zh) => "已上传的副本无法完全还原为本地笔记；本地笔记保持不变。",
            (Self::UploadFailure, Locale::En) => "Failed to upload file: {0}",
            (Self::UploadFailure, Locale::Zh) => "文件上传失败：{0}",
            (Self::UploadSuccess, Locale::En) => "Upload successful: {0}",
            (Self::UploadSuccess, Locale::Zh) => "上传成功：{0}",
            (Self::ValidationFailed, Locale::En) => "WebDAV configuration is invalid: {0}",
            (Self::ValidationFailed, Locale::Zh) => "WebDAV 配置无效：{0}",
            (Self::ValidationSucceeded, Locale::En) => "WebDAV configuration is valid!",
            (Self::ValidationSucceeded, Locale::Zh) => "WebDAV 配置有效！",
        };
    }
}

/// Resolve `key` for `locale` and substitute positional arguments.
///
/// Placeholders are expanded in a single pass, so argument text is never
/// itself scanned for placeholders. Placeholders without an argument are
/// kept verbatim.
pub fn render(key: MessageKey, locale: Locale, args: &[&str]) -> String {
    let template = key.template(locale);
    return PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| return m.as_str());
            return caps
                .get(1)
                .and_then(|m| return m.as_str().parse::<usize>().ok())
                .and_then(|index| return args.get(index).copied())
                .unwrap_or(whole)
                .to_string();
        })
        .into_owned();
}

//! WebDAV transport and the upload cycle built on the link engine.

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::credentials;
use crate::error::Error;
use crate::reverter;
use crate::rewriter;
use crate::scanner;
use crate::types::{Reference, ServerProfile};

/// Request timeout for a single PUT.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Sends a finished document somewhere and reports where it can be read.
pub trait Uploader {
    /// Store `content` as `filename` on `server`; returns the public URL.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigurationIncomplete` before any request when the
    /// profile is missing fields, and transport errors otherwise.
    fn upload(&self, filename: &str, content: &str, server: &ServerProfile) -> Result<String, Error>;
}

/// Result of one completed upload cycle.
#[derive(Debug)]
pub struct UploadOutcome {
    /// References found in the local document, in document order.
    pub references: Vec<Reference>,
    /// Whether reverting the uploaded text reproduced the local document.
    pub restored_exactly: bool,
    /// Public URL of the uploaded copy.
    pub url: String,
}

/// Uploader speaking plain WebDAV: one authenticated `PUT` per file.
pub struct WebDavUploader {
    /// Blocking HTTP client reused across requests.
    client: Client,
}

impl WebDavUploader {
    /// Build an uploader with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns `Error::Request` if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        return Ok(Self { client });
    }
}

impl Uploader for WebDavUploader {
    fn upload(&self, filename: &str, content: &str, server: &ServerProfile) -> Result<String, Error> {
        ensure_complete(server)?;
        let password = credentials::reveal(&server.password, &server.name)?;
        let encoded = urlencoding::encode(filename);
        let target = format!("{}{encoded}", server.webdav_url);

        tracing::debug!(url = %target, bytes = content.len(), "PUT");
        let response = self
            .client
            .put(&target)
            .basic_auth(&server.username, Some(password))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(content.to_string())
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let text = status.canonical_reason().map_or_else(|| return status.as_str().to_string(), str::to_string);
            tracing::debug!(status = status.as_u16(), "upload rejected");
            return Err(Error::TransportFailure { status: text });
        }

        return Ok(format!("{}{encoded}", server.custom_url_prefix));
    }
}

/// Fail before any network attempt if the profile lacks required fields.
///
/// # Errors
///
/// Returns `Error::ConfigurationIncomplete` listing the empty fields.
pub fn ensure_complete(server: &ServerProfile) -> Result<(), Error> {
    let missing = server.missing_fields();
    if missing.is_empty() {
        return Ok(());
    }
    return Err(Error::ConfigurationIncomplete {
        missing,
        server: server.name.clone(),
    });
}

/// Run one upload cycle for the document at `path`.
///
/// The local document is scanned; when it holds references the uploaded
/// copy is rewritten against the profile's URL prefix. After a successful
/// upload the copy is reverted and compared with the local text. The local
/// file itself is never modified.
///
/// # Errors
///
/// Returns `Error::ReadFailure` if the document cannot be read, and any
/// error from `uploader`.
pub fn upload_document(
    path: &Path,
    server: &ServerProfile,
    uploader: &dyn Uploader,
) -> Result<UploadOutcome, Error> {
    let original = scanner::read_document(path)?;
    let filename = path
        .file_name()
        .map_or_else(|| return path.to_string_lossy().into_owned(), |n| return n.to_string_lossy().into_owned());

    let references = scanner::scan(&original);
    let content = if references.is_empty() {
        original.clone()
    } else {
        rewriter::rewrite(&original, &server.custom_url_prefix)
    };

    let url = uploader.upload(&filename, &content, server)?;
    tracing::debug!(%url, references = references.len(), "uploaded");

    let restored_exactly = references.is_empty() || reverter::revert(&content) == original;
    if !restored_exactly {
        tracing::warn!(file = %path.display(), "uploaded copy does not revert to the local document");
    }

    return Ok(UploadOutcome {
        references,
        restored_exactly,
        url,
    });
}

//! Core CLI commands for wikidav: upload, scan, rewrite, revert.

use std::io::Write as _;
use std::path::Path;
use std::process::ExitCode;

use crate::config::{self, Config};
use crate::error;
use crate::messages::{self, Locale, MessageKey};
use crate::reverter;
use crate::rewriter;
use crate::scanner;
use crate::server;
use crate::types::Reference;
use crate::upload::{self, WebDavUploader};

/// Where `rewrite` takes its URL prefix from.
pub enum PrefixSource<'a> {
    /// A prefix given on the command line.
    Literal(&'a str),
    /// The `custom_url_prefix` of a configured server.
    Server(&'a str),
}

/// Render the follow-up notice listing references found in an uploaded note.
pub fn format_reference_notice(references: &[Reference], locale: Locale) -> String {
    let mut out = String::new();
    out.push_str(&messages::render(MessageKey::InternalLinksFound, locale, &[]));
    out.push('\n');
    for reference in references {
        out.push_str("  - ");
        out.push_str(&reference.full_match);
        out.push('\n');
    }
    out.push_str(&messages::render(MessageKey::ConsiderUploading, locale, &[]));
    return out;
}

/// Print the document restored from its rewritten form, or write it back.
///
/// # Errors
///
/// Returns `Error::ReadFailure` if the document cannot be read, or
/// `Error::Io` if writing it back fails.
pub fn revert(file: &Path, in_place: bool) -> Result<(), error::Error> {
    let rewritten = scanner::read_document(file)?;
    let restored = reverter::revert(&rewritten);

    if in_place {
        if restored != rewritten {
            std::fs::write(file, &restored)?;
        }
        eprintln!("Restored {}", file.display());
    } else {
        print!("{restored}");
        std::io::stdout().flush()?;
    }

    return Ok(());
}

/// Print the document with references rewritten as hyperlinks.
///
/// # Errors
///
/// Returns `Error::ReadFailure` if the document cannot be read, or settings
/// and server lookup errors when the prefix comes from a server.
pub fn rewrite(file: &Path, prefix: &PrefixSource<'_>, config_path: &Path) -> Result<(), error::Error> {
    let document = scanner::read_document(file)?;

    let url_prefix = match *prefix {
        PrefixSource::Literal(literal) => literal.to_string(),
        PrefixSource::Server(selector) => {
            let config = Config::load(config_path)?;
            let (_, server) = config.find_server(selector)?;
            server.custom_url_prefix.clone()
        },
    };

    if !config::prefix_is_revertable(&url_prefix) {
        tracing::warn!(prefix = %url_prefix, "prefix has no http(s) scheme; `revert` will not recognize these links");
    }

    print!("{}", rewriter::rewrite(&document, &url_prefix));
    std::io::stdout().flush()?;
    return Ok(());
}

/// List references in a file, or in every markdown file under a directory.
///
/// # Errors
///
/// Returns `Error::ReadFailure` if any document cannot be read.
pub fn scan(path: &Path, json: bool) -> Result<(), error::Error> {
    let found = scanner::scan_path(path)?;

    if json {
        let report: Vec<serde_json::Value> = found
            .iter()
            .map(|(file, references)| {
                return serde_json::json!({
                    "file": file.display().to_string(),
                    "references": references,
                });
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
        return Ok(());
    }

    let mut total = 0_usize;
    for (file, references) in &found {
        for reference in references {
            println!("{}  {}", file.display(), reference.full_match);
        }
        total = total.saturating_add(references.len());
    }
    eprintln!("{total} references");
    return Ok(());
}

/// Upload one document: select a server, rewrite, PUT, verify, report.
///
/// Failures during the upload itself are reported as a localized notice and
/// a failing exit code; they never modify the local document.
///
/// # Errors
///
/// Returns settings loading errors and `Error::UnknownServer` for a bad
/// `--server` selector.
pub fn upload(
    file: &Path,
    requested: Option<&str>,
    config_path: &Path,
    locale_override: Option<Locale>,
) -> Result<ExitCode, error::Error> {
    let config = Config::load(config_path)?;
    let locale = locale_override.unwrap_or(config.locale);

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut prompt = std::io::stderr();
    let server = match server::select_server(&config, requested, &mut input, &mut prompt) {
        Ok(server) => server,
        Err(error::Error::NoServerSelected) => {
            eprintln!("{}", messages::render(MessageKey::NoServerSelected, locale, &[]));
            return Ok(ExitCode::FAILURE);
        },
        Err(error::Error::NoServersConfigured) => {
            eprintln!("{}", messages::render(MessageKey::NoServersConfigured, locale, &[]));
            return Ok(ExitCode::FAILURE);
        },
        Err(e) => return Err(e),
    };

    let uploader = WebDavUploader::new()?;
    let outcome = match upload::upload_document(file, server, &uploader) {
        Ok(outcome) => outcome,
        Err(e @ error::Error::ReadFailure { .. }) => {
            eprintln!("{}", messages::render(MessageKey::NoActiveFile, locale, &[&e.to_string()]));
            return Ok(ExitCode::FAILURE);
        },
        Err(e) => {
            tracing::error!(error = %e, file = %file.display(), "upload failed");
            eprintln!("{}", messages::render(MessageKey::UploadFailure, locale, &[&e.to_string()]));
            return Ok(ExitCode::FAILURE);
        },
    };

    println!("{}", outcome.url);
    eprintln!("{}", messages::render(MessageKey::UploadSuccess, locale, &[&outcome.url]));

    if !outcome.references.is_empty() {
        eprintln!();
        eprintln!("{}", format_reference_notice(&outcome.references, locale));
    }
    if !outcome.restored_exactly {
        eprintln!("{}", messages::render(MessageKey::RoundTripLossy, locale, &[]));
    }

    return Ok(ExitCode::SUCCESS);
}

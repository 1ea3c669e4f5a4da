use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::credentials;
use crate::error;
use crate::messages::{self, Locale, MessageKey};
use crate::types::ServerProfile;
use crate::upload::{Uploader, WebDavUploader};

/// File name used by `server validate`.
const PROBE_FILENAME: &str = "test.txt";

/// Content used by `server validate`.
const PROBE_CONTENT: &str = "This is a test file.";

// ── CLI commands ──────────────────────────────────────────────────────

/// Append a server profile to the settings file. The password is stored obfuscated.
///
/// # Errors
///
/// Returns `Error::DuplicateServer` if the name is taken, or errors from
/// settings editing.
pub fn cmd_add(config_path: &Path, profile: &ServerProfile) -> Result<(), error::Error> {
    let stored = ServerProfile {
        password: credentials::obfuscate(&profile.password),
        ..profile.clone()
    };
    add_to_config(config_path, &stored)?;
    println!("Added server: {}", profile.name);
    return Ok(());
}

/// List configured servers in insertion order.
///
/// # Errors
///
/// Returns errors from settings loading.
pub fn cmd_list(config_path: &Path, locale: Locale) -> Result<(), error::Error> {
    let config = Config::load(config_path)?;

    if config.servers.is_empty() {
        println!("{}", messages::render(MessageKey::NoServersConfigured, locale, &[]));
        return Ok(());
    }

    for (index, server) in config.servers.iter().enumerate() {
        let position = index.saturating_add(1);
        println!("{position}) {} -> {}", server.label(index), server.webdav_url);
        if !server.custom_url_prefix.is_empty() {
            println!("   public: {}", server.custom_url_prefix);
        }
    }
    println!();
    println!("{}", messages::render(MessageKey::PasswordLocal, locale, &[]));

    return Ok(());
}

/// Remove a server profile by name.
///
/// # Errors
///
/// Returns `Error::UnknownServer` if no profile has this name.
pub fn cmd_remove(config_path: &Path, name: &str) -> Result<(), error::Error> {
    remove_from_config(config_path, name)?;
    println!("Removed server: {name}");
    return Ok(());
}

/// Upload a small probe file to check a profile end to end.
///
/// # Errors
///
/// Returns errors from settings loading or server lookup. Upload failures
/// are reported as a notice and turn into a failing exit code instead.
pub fn cmd_validate(config_path: &Path, selector: &str, locale: Locale) -> Result<bool, error::Error> {
    let config = Config::load(config_path)?;
    let (_, server) = config.find_server(selector)?;
    let uploader = WebDavUploader::new()?;

    return match uploader.upload(PROBE_FILENAME, PROBE_CONTENT, server) {
        Ok(_) => {
            println!("{}", messages::render(MessageKey::ValidationSucceeded, locale, &[]));
            Ok(true)
        },
        Err(e) => {
            eprintln!("{}", messages::render(MessageKey::ValidationFailed, locale, &[&e.to_string()]));
            Ok(false)
        },
    };
}

// ── Server selection ──────────────────────────────────────────────────

/// Pick the profile an upload goes to.
///
/// An explicit selector (name or one-based position) wins. Without one, a
/// single profile is used directly; several profiles are listed on `prompt`
/// and the answer is read from `input`. An empty, unreadable, or unknown
/// answer cancels the selection.
///
/// # Errors
///
/// Returns `Error::NoServersConfigured` when there is nothing to choose from,
/// `Error::UnknownServer` for a bad explicit selector, and
/// `Error::NoServerSelected` when the prompt is cancelled.
pub fn select_server<'c>(
    config: &'c Config,
    requested: Option<&str>,
    input: &mut dyn BufRead,
    prompt: &mut dyn Write,
) -> Result<&'c ServerProfile, error::Error> {
    if config.servers.is_empty() {
        return Err(error::Error::NoServersConfigured);
    }

    if let Some(selector) = requested {
        return config.find_server(selector).map(|(_, server)| return server);
    }

    if let [only] = config.servers.as_slice() {
        return Ok(only);
    }

    write_server_menu(config, prompt)?;
    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(0) => return Err(error::Error::NoServerSelected),
        Ok(_) => {},
        Err(e) => {
            tracing::debug!(error = %e, "server prompt answer unreadable");
            return Err(error::Error::NoServerSelected);
        },
    }

    let answer = answer.trim();
    if answer.is_empty() {
        return Err(error::Error::NoServerSelected);
    }

    return config
        .find_server(answer)
        .map(|(_, server)| return server)
        .map_err(|_err| return error::Error::NoServerSelected);
}

/// Print the numbered list of servers followed by the question.
///
/// # Errors
///
/// Returns `Error::Io` if the prompt cannot be written.
fn write_server_menu(config: &Config, prompt: &mut dyn Write) -> Result<(), error::Error> {
    writeln!(prompt, "Choose WebDAV server:")?;
    for (index, server) in config.servers.iter().enumerate() {
        writeln!(prompt, "  {}) {}", index.saturating_add(1), server.label(index))?;
    }
    write!(prompt, "> ")?;
    prompt.flush()?;
    return Ok(());
}

// ── Settings file editing ─────────────────────────────────────────────

/// Parse the settings file into a format-preserving document.
/// Returns an empty document if the file doesn't exist.
///
/// # Errors
///
/// Returns `Error::Io` on read failure or `Error::ParseFailed` on parse failure.
fn read_config_doc(config_path: &Path) -> Result<(PathBuf, toml_edit::DocumentMut), error::Error> {
    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(error::Error::Io(e)),
    };

    let doc: toml_edit::DocumentMut = content.parse().map_err(|e: toml_edit::TomlError| {
        return error::Error::ParseFailed {
            file: config_path.to_path_buf(),
            reason: e.to_string(),
        };
    })?;

    return Ok((config_path.to_path_buf(), doc));
}

/// Append a `[[servers]]` table, creating the array if needed.
///
/// # Errors
///
/// Returns `Error::DuplicateServer` if a server with the same name exists,
/// `Error::ParseFailed` if the settings can't be parsed or `servers` is not
/// an array of tables, or `Error::Io` if writing fails.
fn add_to_config(config_path: &Path, profile: &ServerProfile) -> Result<(), error::Error> {
    let (path, mut doc) = read_config_doc(config_path)?;

    if !doc.contains_key("servers") {
        doc["servers"] = toml_edit::Item::ArrayOfTables(toml_edit::ArrayOfTables::new());
    }

    let servers = doc
        .get_mut("servers")
        .and_then(toml_edit::Item::as_array_of_tables_mut)
        .ok_or_else(|| {
            return error::Error::ParseFailed {
                file: path.clone(),
                reason: "`servers` must be an array of tables".to_string(),
            };
        })?;

    if servers.iter().any(|t| return table_name(t) == Some(profile.name.as_str())) {
        return Err(error::Error::DuplicateServer {
            name: profile.name.clone(),
        });
    }

    let mut table = toml_edit::Table::new();
    table["name"] = toml_edit::value(profile.name.as_str());
    table["webdav_url"] = toml_edit::value(profile.webdav_url.as_str());
    table["custom_url_prefix"] = toml_edit::value(profile.custom_url_prefix.as_str());
    table["username"] = toml_edit::value(profile.username.as_str());
    table["password"] = toml_edit::value(profile.password.as_str());
    servers.push(table);

    std::fs::write(&path, doc.to_string())?;
    return Ok(());
}

/// Remove the `[[servers]]` table with the given name.
///
/// # Errors
///
/// Returns `Error::UnknownServer` if the name isn't found.
fn remove_from_config(config_path: &Path, name: &str) -> Result<(), error::Error> {
    let (path, mut doc) = read_config_doc(config_path)?;

    let servers = doc
        .get_mut("servers")
        .and_then(toml_edit::Item::as_array_of_tables_mut)
        .ok_or_else(|| {
            return error::Error::UnknownServer {
                name: name.to_string(),
            };
        })?;

    let Some(index) = servers.iter().position(|t| return table_name(t) == Some(name)) else {
        return Err(error::Error::UnknownServer {
            name: name.to_string(),
        });
    };
    servers.remove(index);

    std::fs::write(&path, doc.to_string())?;
    return Ok(());
}

/// The `name` key of a server table, if it is a string.
fn table_name(table: &toml_edit::Table) -> Option<&str> {
    return table.get("name").and_then(toml_edit::Item::as_str);
}

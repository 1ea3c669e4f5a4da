use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::messages::Locale;
use crate::types::ServerProfile;

/// Settings file looked up in the working directory by default.
pub const CONFIG_FILE: &str = ".wikidav.toml";

/// Settings loaded from `.wikidav.toml`.
/// Servers keep the order they were added in; prompts number them that way.
#[derive(Debug, Default)]
pub struct Config {
    /// Language for user-facing notices.
    pub locale: Locale,
    /// Configured upload destinations, in insertion order.
    pub servers: Vec<ServerProfile>,
}

/// Raw TOML structure for `.wikidav.toml`.
#[derive(serde::Deserialize)]
struct WikidavTomlConfig {
    /// Language tag such as `en` or `zh-CN`.
    #[serde(default)]
    locale: Option<String>,
    /// `[[servers]]` array of tables.
    #[serde(default)]
    servers: Vec<ServerProfile>,
}

impl Config {
    /// Find a server by exact name, or by one-based position.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownServer` if nothing matches.
    pub fn find_server(&self, selector: &str) -> Result<(usize, &ServerProfile), Error> {
        if let Some(found) = self.servers.iter().enumerate().find(|(_, s)| return s.name == selector) {
            return Ok(found);
        }

        let by_position = selector
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| return n.checked_sub(1))
            .and_then(|index| return self.servers.get(index).map(|s| return (index, s)));

        return by_position.ok_or_else(|| {
            return Error::UnknownServer {
                name: selector.to_string(),
            };
        });
    }

    /// Load settings from `path`.
    /// Returns defaults (no servers, English) if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; never silently
    /// falls back to defaults when the user wrote a settings file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        let raw: WikidavTomlConfig = toml::from_str(&content)?;
        for (index, server) in raw.servers.iter().enumerate() {
            warn_if_prefix_unrevertable(&server.label(index), &server.custom_url_prefix);
        }

        return Ok(Self {
            locale: raw.locale.as_deref().map(Locale::parse).unwrap_or_default(),
            servers: raw.servers,
        });
    }
}

/// Resolve the settings path: an explicit `--config` wins over the default
/// file in the working directory.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    return explicit.map_or_else(|| return PathBuf::from(CONFIG_FILE), Path::to_path_buf);
}

/// Whether hyperlinks built from `prefix` can be turned back into wiki references.
pub fn prefix_is_revertable(prefix: &str) -> bool {
    return prefix.starts_with("http://") || prefix.starts_with("https://");
}

/// Log a warning for prefixes whose links the reverter will not recognize.
fn warn_if_prefix_unrevertable(server: &str, prefix: &str) {
    if !prefix.is_empty() && !prefix_is_revertable(prefix) {
        tracing::warn!(server, prefix, "custom_url_prefix has no http(s) scheme; links built from it cannot be reverted");
    }
}

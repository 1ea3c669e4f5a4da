/// Crate-level error types for wikidav diagnostics.
use std::path::PathBuf;

/// All errors in wikidav carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the file, server, or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A server profile lacks fields an upload needs. Raised before any request.
    #[error("WebDAV configuration is incomplete for `{server}`: missing {}", missing.join(", "))]
    ConfigurationIncomplete {
        /// Fields that are empty.
        missing: Vec<&'static str>,
        /// Label of the incomplete profile.
        server: String,
    },

    /// A server with this name is already configured.
    #[error("server already exists: `{name}`")]
    DuplicateServer {
        /// Name that collided.
        name: String,
    },

    /// The stored password cannot be de-obfuscated.
    #[error("stored password for `{server}` is unreadable: {reason}")]
    InvalidPassword {
        /// Why decoding failed.
        reason: String,
        /// Label of the profile holding the password.
        server: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// The server prompt was answered with nothing usable.
    #[error("no server selected")]
    NoServerSelected,

    /// The settings file holds no server profiles.
    #[error("no WebDAV server configured")]
    NoServersConfigured,

    /// The settings file could not be parsed for editing.
    #[error("parse failed: {}: {reason}", file.display())]
    ParseFailed {
        /// File that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The document could not be read.
    #[error("cannot read {}: {source}", path.display())]
    ReadFailure {
        /// Document that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The HTTP request could not be built or sent.
    #[error("request failed: {0}")]
    Request(
        /// The wrapped transport error.
        #[from]
        reqwest::Error,
    ),

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The server answered the upload with a non-success status.
    #[error("{status}")]
    TransportFailure {
        /// Status text reported by the server.
        status: String,
    },

    /// No configured server matches the given name or position.
    #[error("unknown server: `{name}`")]
    UnknownServer {
        /// Name or position that was not found.
        name: String,
    },
}

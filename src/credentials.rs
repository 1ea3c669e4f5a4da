//! Password obfuscation for the settings file.
//!
//! This is base64, not encryption. It keeps passwords from being readable at
//! a glance in `.wikidav.toml`; anyone with the file can recover them.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::Error;

/// Obfuscate a plaintext password for storage.
pub fn obfuscate(plain: &str) -> String {
    return STANDARD.encode(plain.as_bytes());
}

/// Recover the plaintext password stored for `server`.
///
/// # Errors
///
/// Returns `Error::InvalidPassword` if the stored text is not valid base64
/// or does not decode to UTF-8.
pub fn reveal(stored: &str, server: &str) -> Result<String, Error> {
    let bytes = STANDARD.decode(stored.trim()).map_err(|e| {
        return Error::InvalidPassword {
            reason: e.to_string(),
            server: server.to_string(),
        };
    })?;
    return String::from_utf8(bytes).map_err(|e| {
        return Error::InvalidPassword {
            reason: e.to_string(),
            server: server.to_string(),
        };
    });
}

use std::fmt::Write as _;

use crate::config::CONFIG_FILE;
use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where the user can
/// act on it, how to fix it.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::ConfigurationIncomplete { server, missing } => render_configuration_incomplete(server, missing),
        Error::DuplicateServer { name } => render_duplicate_server(name),
        Error::InvalidPassword { server, reason } => render_invalid_password(server, reason),
        Error::NoServersConfigured => render_no_servers_configured(),
        Error::UnknownServer { name } => render_unknown_server(name),
        _ => render_generic(e),
    }
}

fn render_generic(e: &Error) -> String {
    match e {
        Error::ReadFailure { path, source } => format!("\
# Error: Read Failure

Could not read `{}`: {source}

Nothing was rewritten or uploaded.
", path.display()),

        Error::TransportFailure { status } => format!("\
# Error: Upload Rejected

The server answered: {status}

The local document was not modified.
"),

        Error::Request(e) => format!("\
# Error: Request Failed

{e}

Check the `webdav_url` and your network connection.
"),

        Error::NoServerSelected => "\
# Error: No Server Selected

The upload was cancelled.
"
        .to_string(),

        Error::ParseFailed { file, reason } => format!("\
# Error: Parse Failed

Could not parse `{}`: {reason}
", file.display()),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    }
}

fn render_configuration_incomplete(server: &str, missing: &[&'static str]) -> String {
    let mut out = format!("\
# Error: Configuration Incomplete

Server `{server}` is missing required fields. No request was sent.

## Missing

");
    for field in missing {
        let _ = writeln!(out, "- `{field}`");
    }
    let _ = write!(out, "\
\n## Fix

Re-add the server with every field:

    wikidav server remove {server}
    wikidav server add {server} --webdav-url <url> --prefix <url> --username <user> --password <pass>
");
    out
}

fn render_duplicate_server(name: &str) -> String {
    format!(
        "\
# Error: Duplicate Server

A server named `{name}` already exists in `{CONFIG_FILE}`.

## Fix

Pick another name, or remove the existing one first:

    wikidav server remove {name}
"
    )
}

fn render_invalid_password(server: &str, reason: &str) -> String {
    format!(
        "\
# Error: Unreadable Password

The stored password for `{server}` could not be decoded: {reason}

## Fix

Passwords are stored obfuscated by `wikidav server add`. Re-add the server
instead of editing the password by hand.
"
    )
}

fn render_no_servers_configured() -> String {
    format!(
        "\
# Error: No Server Configured

`{CONFIG_FILE}` has no `[[servers]]` entries.

## Fix

    wikidav server add <name> --webdav-url <url> --prefix <url> --username <user> --password <pass>
"
    )
}

fn render_unknown_server(name: &str) -> String {
    format!(
        "\
# Error: Unknown Server

No server is named `{name}`, and it is not a valid position.

## Fix

List the configured servers:

    wikidav server list
"
    )
}

use std::path::Path;

use serde::Serialize;

use crate::config::Config;
use crate::messages::Locale;

/// Output the comprehensive wikidav reference document.
pub fn run(config_path: &Path, json: bool) {
    let state = gather_state(config_path);

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

struct CurrentState {
    config_found: bool,
    config_path: String,
    locale: Locale,
    servers: Vec<(String, String)>,
}

fn gather_state(config_path: &Path) -> CurrentState {
    let config_found = config_path.exists();
    let config = Config::load(config_path).ok();

    let locale = config.as_ref().map(|c| c.locale).unwrap_or_default();
    let servers: Vec<(String, String)> = config
        .map(|c| {
            c.servers
                .iter()
                .enumerate()
                .map(|(index, s)| (s.label(index), s.custom_url_prefix.clone()))
                .collect()
        })
        .unwrap_or_default();

    CurrentState {
        config_found,
        config_path: config_path.display().to_string(),
        locale,
        servers,
    }
}

// ── Markdown output ───────────────────────────────────────────────────

fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
}

fn print_markdown_header(version: &str) {
    print!(
        "\
# wikidav {version}

Upload markdown notes to WebDAV and turn wiki links into portable hyperlinks
so the uploaded copy still works outside the vault.

## Link Syntax

    [[Note]]                 ->  [Note](<prefix>Note.md)
    [[Note|Shown text]]      ->  [Shown text](<prefix>Note.md)

Links inside `inline code` and fenced ``` blocks are left alone.
`revert` turns http(s) `.md` hyperlinks back into wiki links.

## Workflow

    wikidav server add <name> --webdav-url <url> --prefix <url> --username <u> --password <p>
    wikidav server validate <name>        Upload a probe file to check the profile
    wikidav upload <note.md>              Rewrite links, upload, print the public URL
    wikidav scan <note.md | dir>          List wiki links
    wikidav rewrite <note.md> --prefix <url>
    wikidav revert <copy.md> [--in-place]

## Configuration (.wikidav.toml)

    locale = \"en\"                          # en | zh

    [[servers]]
    name = \"home\"
    webdav_url = \"https://dav.example.com/remote.php/webdav/\"
    custom_url_prefix = \"https://files.example.com/\"
    username = \"me\"
    password = \"c2VjcmV0\"                  # obfuscated, not encrypted

Set `WIKIDAV_LOG=debug` to see transform and transport details.

## Current State

"
    );
}

fn print_markdown_state(state: &CurrentState) {
    if state.config_found {
        println!("Config:  {} (found)", state.config_path);
    } else {
        println!("Config:  {} (not found)", state.config_path);
    }

    println!("Locale:  {}", state.locale.tag());

    if state.servers.is_empty() {
        println!("Servers: (none)");
    } else {
        let list = state
            .servers
            .iter()
            .map(|(name, prefix)| format!("{name} -> {prefix}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("Servers: {list}");
    }
}

fn print_markdown_exit_codes() {
    print!(
        "\
## Exit Codes

| Code | Meaning |
|------|---------|
| 0    | Success |
| 1    | Upload failed, was cancelled, or a runtime error occurred |
"
    );
}

// ── JSON output ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct InfoJson {
    current_state: StateJson,
    exit_codes: Vec<ExitCodeInfo>,
    link_syntax: Vec<SyntaxInfo>,
    version: String,
}

#[derive(Serialize)]
struct SyntaxInfo {
    rewritten: String,
    wiki: String,
}

#[derive(Serialize)]
struct ExitCodeInfo {
    code: u8,
    meaning: String,
}

#[derive(Serialize)]
struct StateJson {
    config_found: bool,
    config_path: String,
    locale: String,
    servers: Vec<ServerJson>,
}

#[derive(Serialize)]
struct ServerJson {
    custom_url_prefix: String,
    name: String,
}

fn print_json(state: &CurrentState) {
    let info = InfoJson {
        current_state: StateJson {
            config_found: state.config_found,
            config_path: state.config_path.clone(),
            locale: state.locale.tag().to_string(),
            servers: state
                .servers
                .iter()
                .map(|(name, prefix)| ServerJson {
                    custom_url_prefix: prefix.clone(),
                    name: name.clone(),
                })
                .collect(),
        },
        exit_codes: vec![
            ExitCodeInfo { code: 0, meaning: "Success".to_string() },
            ExitCodeInfo { code: 1, meaning: "Upload failed, was cancelled, or a runtime error occurred".to_string() },
        ],
        link_syntax: vec![
            SyntaxInfo {
                rewritten: "[Note](<prefix>Note.md)".to_string(),
                wiki: "[[Note]]".to_string(),
            },
            SyntaxInfo {
                rewritten: "[Shown](<prefix>Note.md)".to_string(),
                wiki: "[[Note|Shown]]".to_string(),
            },
        ],
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}

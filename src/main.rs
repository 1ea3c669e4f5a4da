mod commands;
mod config;
mod credentials;
mod diagnostics;
mod error;
mod info;
mod messages;
mod reverter;
mod rewriter;
mod scanner;
mod segment;
mod server;
mod types;
mod upload;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::PrefixSource;
use crate::messages::Locale;
use crate::types::ServerProfile;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "WIKIDAV_LOG";

#[derive(Parser)]
#[command(name = "wikidav", about = "Upload markdown notes to WebDAV with portable wiki links")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Settings file (default: .wikidav.toml in the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Language for notices, overriding the settings file (en, zh)
    #[arg(long, global = true)]
    locale: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Output a reference document describing wikidav
    Info {
        /// Output as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// Print a rewritten copy restored to wiki links
    Revert {
        /// Rewritten markdown file
        file: PathBuf,
        /// Write the result back to the file instead of stdout
        #[arg(long)]
        in_place: bool,
    },
    /// Print the note with wiki links rewritten as hyperlinks
    Rewrite {
        /// Markdown note to rewrite
        file: PathBuf,
        #[command(flatten)]
        prefix: PrefixArgs,
    },
    /// List wiki links in a note, or in every note under a directory
    Scan {
        /// Markdown file or directory
        path: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage WebDAV server profiles
    Server {
        #[command(subcommand)]
        action: ServerAction,
    },
    /// Rewrite wiki links, upload the note, and print its public URL
    Upload {
        /// Markdown note to upload
        file: PathBuf,
        /// Server name or 1-based position (prompted when several exist)
        #[arg(long)]
        server: Option<String>,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct PrefixArgs {
    /// URL prefix the hyperlinks point under
    #[arg(long)]
    prefix: Option<String>,
    /// Use the custom URL prefix of a configured server
    #[arg(long)]
    server: Option<String>,
}

#[derive(Subcommand)]
enum ServerAction {
    /// Add a server profile
    Add {
        /// Profile name
        name: String,
        /// Public URL prefix uploaded files are reachable under
        #[arg(long, default_value = "")]
        prefix: String,
        /// Password (stored obfuscated, not encrypted)
        #[arg(long, default_value = "")]
        password: String,
        /// WebDAV login
        #[arg(long, default_value = "")]
        username: String,
        /// WebDAV collection URL files are uploaded into
        #[arg(long, default_value = "")]
        webdav_url: String,
    },
    /// List configured servers
    List,
    /// Remove a server profile
    Remove {
        /// Profile name
        name: String,
    },
    /// Upload a probe file to check a server profile
    Validate {
        /// Server name or 1-based position
        name: String,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let config_path = config::config_path(cli.config.as_deref());
    let locale_override = cli.locale.as_deref().map(Locale::parse);

    let result = match cli.command {
        Commands::Info { json } => {
            info::run(&config_path, json);
            Ok(ExitCode::SUCCESS)
        },
        Commands::Revert { file, in_place } => {
            commands::revert(&file, in_place).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Rewrite { file, prefix } => {
            let source = match (&prefix.prefix, &prefix.server) {
                (Some(literal), _) => PrefixSource::Literal(literal),
                (None, Some(server)) => PrefixSource::Server(server),
                (None, None) => PrefixSource::Literal(""),
            };
            commands::rewrite(&file, &source, &config_path).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Scan { path, json } => commands::scan(&path, json).map(|()| return ExitCode::SUCCESS),
        Commands::Server { action } => run_server_action(action, &config_path, locale_override),
        Commands::Upload { file, server } => {
            commands::upload(&file, server.as_deref(), &config_path, locale_override)
        },
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}

/// Install the stderr log subscriber. Filter comes from `WIKIDAV_LOG`,
/// defaulting to warnings only.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_err| return EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Dispatch `server` subcommands.
///
/// # Errors
///
/// Returns errors from settings loading or editing.
fn run_server_action(
    action: ServerAction,
    config_path: &std::path::Path,
    locale_override: Option<Locale>,
) -> Result<ExitCode, error::Error> {
    let locale = match locale_override {
        Some(locale) => locale,
        None => config::Config::load(config_path)?.locale,
    };

    return match action {
        ServerAction::Add { name, prefix, password, username, webdav_url } => {
            let profile = ServerProfile {
                custom_url_prefix: prefix,
                name,
                password,
                username,
                webdav_url,
            };
            server::cmd_add(config_path, &profile).map(|()| return ExitCode::SUCCESS)
        },
        ServerAction::List => server::cmd_list(config_path, locale).map(|()| return ExitCode::SUCCESS),
        ServerAction::Remove { name } => server::cmd_remove(config_path, &name).map(|()| return ExitCode::SUCCESS),
        ServerAction::Validate { name } => {
            let valid = server::cmd_validate(config_path, &name, locale)?;
            Ok(if valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        },
    };
}

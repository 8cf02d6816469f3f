//! ledgerdesk - command-line host for the ledgerdesk API client.
//!
//! Keeps one session per kind on disk, sends requests through the
//! refresh-and-replay pipeline, and tells the user when a session has
//! ended and where to log in again.

mod cli;
mod commands;
mod config;
mod output;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::session as session_cmd;
use config::Settings;

/// Crates whose events `-v` turns up; everything else stays at warn.
const LOG_TARGETS: &[&str] = &["ledgerdesk", "ledgerdesk_http", "ledgerdesk_file", "ledgerdesk_core"];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let settings = Settings::resolve(cli.kind, cli.base_url, cli.store_dir)?;

    match cli.command {
        Commands::Session(cmd) => session_cmd::handle(cmd, &settings).await,
    }
}

/// Filter directives for a `-v` count: client crates get the requested
/// level, dependencies such as reqwest and hyper stay at warn.
fn log_directives(verbosity: u8) -> String {
    let level = match verbosity {
        0 => return "warn".to_string(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let mut directives = vec!["warn".to_string()];
    directives.extend(LOG_TARGETS.iter().map(|t| format!("{}={}", t, level)));
    directives.join(",")
}

fn init_logging(verbosity: u8, json: bool) {
    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directives(verbosity)));

    // stderr keeps stdout parseable for `request` and `whoami --json`.
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(verbosity > 2);
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(layer.json()).init();
    } else {
        registry.with(layer).init();
    }
}

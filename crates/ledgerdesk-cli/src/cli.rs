//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ledgerdesk_core::SessionKind;

use crate::commands::session::SessionCommand;

/// Ledgerdesk API session tool.
#[derive(Parser, Debug)]
#[command(name = "ledgerdesk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Session kind to operate on (admin or user)
    #[arg(long, global = true, default_value = "user", env = "LEDGERDESK_KIND")]
    pub kind: SessionKind,

    /// API base URL
    #[arg(long, global = true, env = "LEDGERDESK_API_URL")]
    pub base_url: Option<String>,

    /// Directory holding persisted sessions
    #[arg(long, global = true, env = "LEDGERDESK_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Session operations
    Session(SessionCommand),
}

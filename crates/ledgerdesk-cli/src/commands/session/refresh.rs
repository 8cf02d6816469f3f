//! Refresh command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::config::Settings;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs, settings: &Settings) -> Result<()> {
    let store = storage::open_store(settings)?;
    let client = storage::open_client(settings, store)?;

    eprintln!("{}", "Refreshing session...".dimmed());

    let session = client.refresh().await.context("Failed to refresh session")?;

    output::success("Session refreshed successfully");
    output::field("Scope", session.scope_context());

    Ok(())
}

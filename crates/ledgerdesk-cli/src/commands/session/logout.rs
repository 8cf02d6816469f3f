//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use ledgerdesk_core::SessionStore;

use crate::config::Settings;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, settings: &Settings) -> Result<()> {
    let store = storage::open_store(settings)?;

    // Logging out needs no API URL, so go straight to the store.
    store.clear().await.context("Failed to clear session")?;

    output::success("Logged out");
    Ok(())
}

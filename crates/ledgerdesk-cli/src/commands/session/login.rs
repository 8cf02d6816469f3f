//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::json;

use ledgerdesk_core::SessionKind;

use crate::config::Settings;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,

    /// Login endpoint path (defaults per session kind)
    #[arg(long)]
    pub path: Option<String>,
}

fn default_login_path(kind: SessionKind) -> &'static str {
    match kind {
        SessionKind::Admin => "/admin/auth/login",
        SessionKind::User => "/auth/login",
    }
}

pub async fn run(args: LoginArgs, settings: &Settings) -> Result<()> {
    let store = storage::open_store(settings)?;
    let client = storage::open_client(settings, store)?;
    let path = args
        .path
        .unwrap_or_else(|| default_login_path(settings.kind).to_string());

    eprintln!("{}", "Logging in...".dimmed());

    let credentials = json!({ "email": args.email, "password": args.password });
    let session = client
        .login(&path, &credentials)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("Kind", Some(&settings.kind.to_string()));
    output::field("API", Some(client.config().base_url().as_str()));
    output::field("Scope", session.scope_context());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_path_follows_kind() {
        assert_eq!(default_login_path(SessionKind::Admin), "/admin/auth/login");
        assert_eq!(default_login_path(SessionKind::User), "/auth/login");
    }
}

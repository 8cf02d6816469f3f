//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use ledgerdesk_core::SessionStore;

use crate::config::Settings;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the session summary as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WhoamiArgs, settings: &Settings) -> Result<()> {
    let store = storage::open_store(settings)?;
    let session = store
        .load()
        .await
        .context("Failed to load session")?
        .context("No active session. Run 'ledgerdesk session login' first.")?;

    // Opaque tokens simply have no claims to show.
    let claims = session.claims().ok();
    let subject = claims.as_ref().and_then(|c| c.subject());
    let expires = claims
        .as_ref()
        .and_then(|c| c.expires_at())
        .map(|t| t.to_rfc3339());
    let saved = store
        .saved_at()
        .context("Failed to read session metadata")?
        .map(|t| t.to_rfc3339());

    if args.json {
        return output::document(&json!({
            "kind": settings.kind.to_string(),
            "namespace": store.namespace().as_str(),
            "scope": session.scope_context(),
            "subject": subject,
            "expires_at": expires,
            "saved_at": saved,
        }), true);
    }

    output::field("Kind", Some(&settings.kind.to_string()));
    output::field("Namespace", Some(store.namespace().as_str()));
    output::field("Scope", session.scope_context());
    output::field("Subject", subject.as_deref());
    output::field("Expires", expires.as_deref());
    output::field("Saved", saved.as_deref());

    Ok(())
}

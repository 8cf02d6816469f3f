//! Opens the on-disk session store and the authenticated client over it.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use ledgerdesk_core::{AuthFailure, StorageNamespace};
use ledgerdesk_file::FileSessionStore;
use ledgerdesk_http::AuthClient;

use crate::config::Settings;
use crate::output;

/// Open the file store for the selected session kind.
pub fn open_store(settings: &Settings) -> Result<Arc<FileSessionStore>> {
    let namespace =
        StorageNamespace::new(settings.kind.namespace()).context("Invalid storage namespace")?;
    let store = FileSessionStore::new(&settings.store_dir, namespace);
    debug!(path = %store.session_path().display(), "Using session file");
    Ok(Arc::new(store))
}

/// Build an authenticated client persisting to `store`.
///
/// When a session can no longer be refreshed the user is told where to
/// log in again.
pub fn open_client(settings: &Settings, store: Arc<FileSessionStore>) -> Result<AuthClient> {
    let config = settings.client_config()?;

    AuthClient::builder(config, store)
        .on_auth_failure(|failure: &AuthFailure| {
            warn!(namespace = %failure.namespace, redirect_to = %failure.redirect_to, "Session ended");
            output::notice(&session_expired_notice(failure));
        })
        .build()
        .context("Failed to create API client")
}

fn session_expired_notice(failure: &AuthFailure) -> String {
    format!(
        "Session expired ({}), log in again at {}",
        failure.namespace, failure.redirect_to
    )
}

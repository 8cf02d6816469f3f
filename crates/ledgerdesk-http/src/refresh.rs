//! Session refresh protocol.
//!
//! A credentialed request that receives a 401 moves through
//! `Fresh -> Refreshing -> Replayed | Failed`:
//!
//! - `Refreshing`: the refresh endpoint is called with the refresh token only.
//! - `Replayed`: the new session is stored and the original request is sent
//!   again, exactly once, with the new access token.
//! - `Failed`: the session is cleared, the auth failure handler is notified,
//!   and the caller receives the original 401.
//!
//! Refreshes are single-flight per client: concurrent 401s queue on one
//! lock, and whoever gets it second sees the session already replaced (or
//! already cleared) and does not call the endpoint again.

use std::fmt;

use tracing::{debug, info, warn};

use ledgerdesk_core::error::{AuthError, Error};
use ledgerdesk_core::{AccessToken, AuthFailure, RefreshCredential, Result, Session};

use crate::client::AuthClient;
use crate::request::Attempt;
use crate::response::ApiResponse;

/// States of the refresh protocol, as reported in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefreshState {
    Refreshing,
    Replayed,
    Failed,
}

impl fmt::Display for RefreshState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefreshState::Refreshing => "refreshing",
            RefreshState::Replayed => "replayed",
            RefreshState::Failed => "failed",
        };
        f.write_str(name)
    }
}

impl AuthClient {
    /// Recover from a 401 on the first attempt: refresh, then replay.
    ///
    /// `seen` is the access token the rejected request carried.
    pub(crate) async fn recover(
        &self,
        replay: Attempt<'_>,
        seen: AccessToken,
        original: Error,
    ) -> Result<ApiResponse> {
        debug!(state = %RefreshState::Refreshing, "Access token rejected");

        let session = match self.refresh_single_flight(Some(&seen)).await {
            Ok(session) => session,
            Err(e) => {
                debug!(error = %e, "No session to replay with, returning original error");
                return Err(original);
            }
        };

        self.dispatch(replay, Some(session.access_token())).await
    }

    /// Obtain a session newer than `seen`, refreshing at most once across
    /// all concurrent callers.
    ///
    /// With `seen == None` a refresh is always performed (explicit refresh).
    pub(crate) async fn refresh_single_flight(&self, seen: Option<&AccessToken>) -> Result<Session> {
        let _guard = self.inner.refresh_lock.lock().await;

        let current = self.load_session().await?;
        let Some(current) = current else {
            // Either never logged in or a concurrent refresh already failed
            // and escalated.
            return Err(AuthError::NoSession.into());
        };

        if let Some(seen) = seen
            && current.access_token() != seen
        {
            debug!("Session already refreshed by a concurrent request");
            return Ok(current);
        }

        match self.call_refresh_endpoint(&current).await {
            Ok(session) => {
                if let Err(e) = self.persist(&session).await {
                    // The old pair is already rotated server-side; keep the
                    // new one so the replay and later requests can use it.
                    warn!(error = %e, "Failed to store refreshed session, holding it in memory");
                    self.overlay().unsaved = Some(session.clone());
                }
                info!(scope = ?session.scope_context(), "Session refreshed");
                Ok(session)
            }
            Err(e) => {
                self.escalate(&current, &e).await;
                Err(AuthError::RefreshFailed {
                    reason: e.to_string(),
                }
                .into())
            }
        }
    }

    async fn call_refresh_endpoint(&self, current: &Session) -> Result<Session> {
        let config = &self.inner.config;
        let credential = match config.refresh_credential() {
            RefreshCredential::Bearer => Some(current.refresh_token()),
            RefreshCredential::Cookie => None,
        };
        let response = self
            .inner
            .http
            .post_refresh(config.refresh_path(), credential)
            .await?;

        if !response.is_success() {
            return Err(Error::Protocol(response.to_protocol_error()));
        }

        let fields = config.token_fields();
        response
            .json_value()
            .and_then(|body| Session::from_response_body(&body, fields, config.scope_claim()))
            .ok_or_else(|| {
                AuthError::MissingTokens {
                    access: fields.access().to_string(),
                    refresh: fields.refresh().to_string(),
                }
                .into()
            })
    }

    /// Clear the session and tell the host to route to the entry point.
    ///
    /// If the store cannot be cleared, `failed`'s access token is revoked
    /// in memory so it is never attached again.
    async fn escalate(&self, failed: &Session, cause: &Error) {
        let config = &self.inner.config;
        warn!(state = %RefreshState::Failed, error = %cause, "Session refresh failed, clearing session");

        self.overlay().unsaved = None;
        if let Err(e) = self.inner.store.clear().await {
            warn!(error = %e, "Failed to clear session after refresh failure, revoking it in memory");
            self.overlay().revoked = Some(failed.access_token().clone());
        }

        if let Some(handler) = &self.inner.on_failure {
            handler.on_auth_failure(&AuthFailure {
                namespace: config.storage_namespace().clone(),
                redirect_to: config.entry_path().to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_render_lowercase() {
        assert_eq!(RefreshState::Refreshing.to_string(), "refreshing");
        assert_eq!(RefreshState::Failed.to_string(), "failed");
    }
}

//! The session entity.

use serde_json::Value;
use tracing::debug;

use crate::claims::Claims;
use crate::config::TokenFieldNames;
use crate::error::Error;
use crate::tokens::{AccessToken, RefreshToken};

/// An authenticated session: an access/refresh token pair plus the scope
/// context decoded from the access token.
///
/// A `Session` always carries both tokens. "No session" is expressed as
/// `Option<Session>` by the stores, so a half-written pair cannot exist.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access_token: AccessToken,
    refresh_token: RefreshToken,
    scope_context: Option<String>,
}

impl Session {
    /// Create a session with no scope context.
    pub fn new(access_token: AccessToken, refresh_token: RefreshToken) -> Self {
        Self {
            access_token,
            refresh_token,
            scope_context: None,
        }
    }

    /// Create a session, reading the scope context out of the access token
    /// claims when `scope_claim` is set.
    ///
    /// Opaque (non-JWT) access tokens are accepted; they simply yield no
    /// scope context.
    pub fn from_tokens(
        access_token: AccessToken,
        refresh_token: RefreshToken,
        scope_claim: Option<&str>,
    ) -> Self {
        let scope_context = scope_claim.and_then(|claim| match Claims::decode(&access_token) {
            Ok(claims) => claims.get_string(claim),
            Err(e) => {
                debug!(error = %e, "Access token claims not readable, no scope context");
                None
            }
        });

        Self {
            access_token,
            refresh_token,
            scope_context,
        }
    }

    /// Build a session from a response body that carries both token fields.
    ///
    /// Returns `None` unless both fields are present as non-empty strings.
    pub fn from_response_body(
        body: &Value,
        fields: &TokenFieldNames,
        scope_claim: Option<&str>,
    ) -> Option<Self> {
        let access = body.get(fields.access())?.as_str()?;
        let refresh = body.get(fields.refresh())?.as_str()?;
        if access.is_empty() || refresh.is_empty() {
            return None;
        }

        Some(Self::from_tokens(
            AccessToken::new(access),
            RefreshToken::new(refresh),
            scope_claim,
        ))
    }

    /// Replace the scope context.
    pub fn with_scope_context(mut self, scope_context: Option<String>) -> Self {
        self.scope_context = scope_context;
        self
    }

    /// Returns the access token.
    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    /// Returns the refresh token.
    pub fn refresh_token(&self) -> &RefreshToken {
        &self.refresh_token
    }

    /// Returns the scope context (e.g. the active company id), if any.
    pub fn scope_context(&self) -> Option<&str> {
        self.scope_context.as_deref()
    }

    /// Decode the access token claims.
    pub fn claims(&self) -> Result<Claims, Error> {
        Claims::decode(&self.access_token)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("scope_context", &self.scope_context)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

//! Client configuration.
//!
//! One [`ClientConfig`] parameterizes the authenticated client. The
//! [`SessionKind`] presets carry the token field names, storage namespace,
//! refresh path and scope claim used by the admin and user consoles.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, InvalidInputError};
use crate::types::{ApiUrl, StorageNamespace, validate_path};

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default unauthenticated entry path reported on auth failure.
pub const DEFAULT_ENTRY_PATH: &str = "/";

/// The kind of session a client manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    /// Back-office administrator session.
    Admin,
    /// Company user session, scoped to the active company.
    User,
}

impl SessionKind {
    /// Response/body field names for this kind's token pair.
    pub fn token_fields(self) -> TokenFieldNames {
        match self {
            SessionKind::Admin => TokenFieldNames::new("adminAccessToken", "adminRefreshToken"),
            SessionKind::User => TokenFieldNames::new("accessToken", "refreshToken"),
        }
    }

    /// Path of the refresh endpoint.
    pub fn refresh_path(self) -> &'static str {
        match self {
            SessionKind::Admin => "/admin/auth/refresh",
            SessionKind::User => "/auth/refresh",
        }
    }

    /// Storage namespace for persisted tokens.
    pub fn namespace(self) -> &'static str {
        match self {
            SessionKind::Admin => "admin",
            SessionKind::User => "user",
        }
    }

    /// Claim carrying the scope context, if this kind has one.
    pub fn scope_claim(self) -> Option<&'static str> {
        match self {
            SessionKind::Admin => None,
            SessionKind::User => Some("current_company_id"),
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

impl FromStr for SessionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(SessionKind::Admin),
            "user" => Ok(SessionKind::User),
            other => Err(InvalidInputError::Other {
                message: format!("unknown session kind '{}' (expected admin or user)", other),
            }
            .into()),
        }
    }
}

/// Field names under which an API response carries the token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFieldNames {
    access: String,
    refresh: String,
}

impl TokenFieldNames {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }

    pub fn access(&self) -> &str {
        &self.access
    }

    pub fn refresh(&self) -> &str {
        &self.refresh
    }
}

/// How the refresh call identifies the session being refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshCredential {
    /// Send the stored refresh token as `Authorization: Bearer <token>`.
    #[default]
    Bearer,
    /// Send no header and rely on a cookie set by the login response.
    Cookie,
}

/// Configuration for one authenticated client instance.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: ApiUrl,
    refresh_path: String,
    token_fields: TokenFieldNames,
    storage_namespace: StorageNamespace,
    scope_claim: Option<String>,
    entry_path: String,
    timeout: Duration,
    refresh_credential: RefreshCredential,
}

impl ClientConfig {
    /// Build a configuration from a session kind preset.
    pub fn for_kind(kind: SessionKind, base_url: ApiUrl) -> Self {
        Self {
            base_url,
            refresh_path: kind.refresh_path().to_string(),
            token_fields: kind.token_fields(),
            storage_namespace: StorageNamespace::preset(kind.namespace()),
            scope_claim: kind.scope_claim().map(str::to_string),
            entry_path: DEFAULT_ENTRY_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
            refresh_credential: RefreshCredential::default(),
        }
    }

    /// Override the refresh endpoint path.
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Result<Self, Error> {
        let path = path.into();
        validate_path(&path)?;
        self.refresh_path = path;
        Ok(self)
    }

    /// Override the token field names.
    pub fn with_token_fields(mut self, fields: TokenFieldNames) -> Self {
        self.token_fields = fields;
        self
    }

    /// Override the storage namespace.
    pub fn with_namespace(mut self, namespace: StorageNamespace) -> Self {
        self.storage_namespace = namespace;
        self
    }

    /// Override (or remove) the scope claim.
    pub fn with_scope_claim(mut self, claim: Option<&str>) -> Self {
        self.scope_claim = claim.map(str::to_string);
        self
    }

    /// Override the entry path reported when the session cannot be recovered.
    pub fn with_entry_path(mut self, path: impl Into<String>) -> Self {
        self.entry_path = path.into();
        self
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Choose how the refresh call carries the session credential.
    pub fn with_refresh_credential(mut self, credential: RefreshCredential) -> Self {
        self.refresh_credential = credential;
        self
    }

    pub fn base_url(&self) -> &ApiUrl {
        &self.base_url
    }

    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    pub fn token_fields(&self) -> &TokenFieldNames {
        &self.token_fields
    }

    pub fn storage_namespace(&self) -> &StorageNamespace {
        &self.storage_namespace
    }

    pub fn scope_claim(&self) -> Option<&str> {
        self.scope_claim.as_deref()
    }

    pub fn entry_path(&self) -> &str {
        &self.entry_path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn refresh_credential(&self) -> RefreshCredential {
        self.refresh_credential
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> ApiUrl {
        ApiUrl::new("https://api.example.com").unwrap()
    }

    #[test]
    fn presets_differ_per_kind() {
        let admin = ClientConfig::for_kind(SessionKind::Admin, api());
        let user = ClientConfig::for_kind(SessionKind::User, api());

        assert_eq!(admin.token_fields().access(), "adminAccessToken");
        assert_eq!(user.token_fields().refresh(), "refreshToken");
        assert_ne!(admin.storage_namespace(), user.storage_namespace());
        assert_eq!(user.scope_claim(), Some("current_company_id"));
        assert_eq!(admin.scope_claim(), None);
        assert_eq!(user.entry_path(), "/");
        assert_eq!(user.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(user.refresh_credential(), RefreshCredential::Bearer);
    }

    #[test]
    fn refresh_path_is_validated() {
        let config = ClientConfig::for_kind(SessionKind::User, api());
        assert!(config.clone().with_refresh_path("auth/refresh").is_err());
        let config = config.with_refresh_path("/v2/auth/refresh").unwrap();
        assert_eq!(config.refresh_path(), "/v2/auth/refresh");
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Admin".parse::<SessionKind>().unwrap(), SessionKind::Admin);
        assert_eq!("user".parse::<SessionKind>().unwrap(), SessionKind::User);
        assert!("root".parse::<SessionKind>().is_err());
    }
}

//! Error types for the ledgerdesk client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, protocol, storage, and input validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for ledgerdesk operations.
///
/// Callers of the authenticated client only ever observe one of these
/// after recovery (refresh and replay) has been attempted.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, HTTP plumbing).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (no session, refresh failure).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Non-success responses from the API.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Session store failures.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Input validation errors (URL, namespace, path, token format).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true if this error is an HTTP 401 from the API.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Error::Protocol(e) if e.is_auth_expired())
    }

    /// Returns the HTTP status for protocol errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Protocol(e) => Some(e.status),
            _ => None,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No session is stored for this client.
    #[error("no active session")]
    NoSession,

    /// The refresh call failed; the session has been cleared.
    #[error("session refresh failed: {reason}")]
    RefreshFailed { reason: String },

    /// A login or refresh response did not carry the expected token pair.
    #[error("response is missing the '{access}'/'{refresh}' token fields")]
    MissingTokens { access: String, refresh: String },
}

/// Protocol-level errors from non-success API responses.
#[derive(Debug, Clone)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code (if present).
    pub error: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// Check if this response signals an expired or rejected access token.
    pub fn is_auth_expired(&self) -> bool {
        self.status == 401
    }
}

/// Session store errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },

    /// Stored session could not be encoded or decoded.
    #[error("invalid stored session: {message}")]
    Corrupt { message: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid storage namespace.
    #[error("invalid storage namespace '{value}': {reason}")]
    Namespace { value: String, reason: String },

    /// Invalid request path.
    #[error("invalid request path '{value}': {reason}")]
    Path { value: String, reason: String },

    /// Access token could not be decoded.
    #[error("malformed token: {reason}")]
    Token { reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_display_includes_code_and_message() {
        let err = ProtocolError::new(
            403,
            Some("Forbidden".to_string()),
            Some("company mismatch".to_string()),
        );
        assert_eq!(err.to_string(), "HTTP 403 [Forbidden]: company mismatch");
    }

    #[test]
    fn only_401_is_auth_expired() {
        assert!(Error::from(ProtocolError::new(401, None, None)).is_auth_expired());
        assert!(!Error::from(ProtocolError::new(403, None, None)).is_auth_expired());
        assert!(!Error::from(TransportError::Timeout { duration_ms: 10 }).is_auth_expired());
    }
}

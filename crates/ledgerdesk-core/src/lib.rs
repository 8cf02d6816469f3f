//! ledgerdesk-core - Core types and traits for the ledgerdesk API client.
//!
//! This crate holds everything the authenticated client and its session
//! stores share: the [`Session`] entity, token newtypes, unverified claim
//! decoding, the [`ClientConfig`] that parameterizes a client per
//! [`SessionKind`], the unified [`Error`], and the [`SessionStore`] and
//! [`AuthFailureHandler`] seams.

pub mod claims;
pub mod config;
pub mod error;
pub mod memory;
pub mod session;
pub mod tokens;
pub mod traits;
pub mod types;

pub use claims::Claims;
pub use config::{ClientConfig, RefreshCredential, SessionKind, TokenFieldNames};
pub use error::Error;
pub use memory::MemorySessionStore;
pub use session::Session;
pub use tokens::{AccessToken, RefreshToken};
pub use traits::{AuthFailure, AuthFailureHandler, SessionStore};
pub use types::{ApiUrl, StorageNamespace};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

//! Validated value types.
//!
//! These types enforce their invariants at construction time,
//! so an invalid base URL or namespace never reaches the client.

mod api_url;
mod namespace;

pub use api_url::ApiUrl;
pub use namespace::StorageNamespace;

pub(crate) use api_url::validate_path;

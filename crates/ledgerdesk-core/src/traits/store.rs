//! Session persistence trait.

use async_trait::async_trait;

use crate::{Result, Session};

/// Durable storage for the current session of one namespace.
///
/// Implementations replace the whole session on `save`; readers never
/// observe a mix of old and new tokens.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the stored session, or `None` if never set or cleared.
    async fn load(&self) -> Result<Option<Session>>;

    /// Store a session, overwriting any previous one.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Remove the stored session. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<()>;
}

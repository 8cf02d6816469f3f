//! In-memory session store.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::traits::SessionStore;
use crate::{Result, Session};

/// Session store that lives only as long as the process.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slot: Arc<RwLock<Option<Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding a session.
    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(session))),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        Ok(slot.clone())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccessToken, RefreshToken};

    fn session(access: &str, refresh: &str) -> Session {
        Session::new(AccessToken::new(access), RefreshToken::new(refresh))
    }

    #[tokio::test]
    async fn save_then_load_returns_same_tokens() {
        let store = MemorySessionStore::new();
        assert!(store.load().await.unwrap().is_none());

        store.save(&session("a1", "r1")).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.access_token().as_str(), "a1");
        assert_eq!(loaded.refresh_token().as_str(), "r1");

        store.save(&session("a2", "r2")).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.access_token().as_str(), "a2");
    }

    #[tokio::test]
    async fn clear_removes_session() {
        let store = MemorySessionStore::with_session(session("a", "r"));
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        // Idempotent.
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemorySessionStore::new();
        let other = store.clone();
        store.save(&session("a", "r")).await.unwrap();
        assert!(other.load().await.unwrap().is_some());
    }
}

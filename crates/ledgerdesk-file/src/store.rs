//! Filesystem-backed session store.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use ledgerdesk_core::error::{Error, StorageError};
use ledgerdesk_core::{AccessToken, RefreshToken, Result, Session, SessionStore, StorageNamespace};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

const SESSION_FILE: &str = "session.json";
const LOCK_FILE: &str = "session.lock";

fn map_io(path: &Path, err: std::io::Error) -> Error {
    Error::Storage(StorageError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// On-disk session layout.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    access_token: String,
    refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope_context: Option<String>,
    saved_at: DateTime<Utc>,
}

/// Session store persisting one namespace to `<root>/<namespace>/session.json`.
///
/// Writes go to a uniquely named temp file which is renamed over the
/// session file while an exclusive lock on `session.lock` is held, so
/// concurrent readers see either the old or the new session in full.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    root: PathBuf,
    namespace: StorageNamespace,
}

impl FileSessionStore {
    /// Create a store for `namespace` under `root`. Nothing is created on
    /// disk until the first `save`.
    pub fn new(root: impl AsRef<Path>, namespace: StorageNamespace) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            namespace,
        }
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the namespace this store persists.
    pub fn namespace(&self) -> &StorageNamespace {
        &self.namespace
    }

    /// Get the session file path.
    pub fn session_path(&self) -> PathBuf {
        self.namespace_dir().join(SESSION_FILE)
    }

    /// When the stored session was last written, if there is one.
    pub fn saved_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.read_stored()?.map(|stored| stored.saved_at))
    }

    fn namespace_dir(&self) -> PathBuf {
        self.root.join(self.namespace.as_str())
    }

    fn lock_path(&self) -> PathBuf {
        self.namespace_dir().join(LOCK_FILE)
    }

    /// Open and lock the namespace lock file. The lock is released when the
    /// returned file is dropped.
    fn lock(&self, exclusive: bool) -> Result<File> {
        let dir = self.namespace_dir();
        fs::create_dir_all(&dir).map_err(|e| map_io(&dir, e))?;

        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| map_io(&lock_path, e))?;

        let locked = if exclusive {
            FileExt::lock_exclusive(&lock_file)
        } else {
            FileExt::lock_shared(&lock_file)
        };
        locked.map_err(|e| map_io(&lock_path, e))?;

        Ok(lock_file)
    }

    fn read_stored(&self) -> Result<Option<StoredSession>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }

        let lock_file = self.lock(false)?;

        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            // Cleared between the existence check and taking the lock.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(map_io(&path, e)),
        };

        FileExt::unlock(&lock_file).map_err(|e| map_io(&self.lock_path(), e))?;

        let stored: StoredSession = serde_json::from_str(&json).map_err(|e| {
            Error::Storage(StorageError::Corrupt {
                message: format!("{}: {}", path.display(), e),
            })
        })?;

        Ok(Some(stored))
    }

    fn write_stored(&self, stored: &StoredSession) -> Result<()> {
        let json = serde_json::to_string_pretty(stored).map_err(|e| {
            Error::Storage(StorageError::Corrupt {
                message: e.to_string(),
            })
        })?;

        let lock_file = self.lock(true)?;

        let path = self.session_path();
        let temp_path = self
            .namespace_dir()
            .join(format!("session.{}.tmp", Uuid::new_v4().simple()));

        let mut temp = File::create(&temp_path).map_err(|e| map_io(&temp_path, e))?;

        // Set restrictive permissions before any secret is written (Unix only)
        #[cfg(unix)]
        {
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&temp_path, perms).map_err(|e| map_io(&temp_path, e))?;
        }

        temp.write_all(json.as_bytes())
            .map_err(|e| map_io(&temp_path, e))?;
        temp.sync_data().map_err(|e| map_io(&temp_path, e))?;
        drop(temp);

        fs::rename(&temp_path, &path).map_err(|e| map_io(&path, e))?;

        FileExt::unlock(&lock_file).map_err(|e| map_io(&self.lock_path(), e))?;

        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    #[instrument(skip(self), fields(namespace = %self.namespace))]
    async fn load(&self) -> Result<Option<Session>> {
        let session = self.read_stored()?.map(|stored| {
            Session::new(
                AccessToken::new(stored.access_token),
                RefreshToken::new(stored.refresh_token),
            )
            .with_scope_context(stored.scope_context)
        });

        debug!(present = session.is_some(), "Loaded session");
        Ok(session)
    }

    #[instrument(skip(self, session), fields(namespace = %self.namespace))]
    async fn save(&self, session: &Session) -> Result<()> {
        let stored = StoredSession {
            access_token: session.access_token().as_str().to_string(),
            refresh_token: session.refresh_token().as_str().to_string(),
            scope_context: session.scope_context().map(str::to_string),
            saved_at: Utc::now(),
        };

        self.write_stored(&stored)?;

        debug!(path = %self.session_path().display(), "Saved session");
        Ok(())
    }

    #[instrument(skip(self), fields(namespace = %self.namespace))]
    async fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(());
        }

        let lock_file = self.lock(true)?;

        match fs::remove_file(&path) {
            Ok(()) => debug!("Cleared session"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(map_io(&path, e)),
        }

        FileExt::unlock(&lock_file).map_err(|e| map_io(&self.lock_path(), e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir, namespace: &str) -> FileSessionStore {
        FileSessionStore::new(dir.path(), StorageNamespace::new(namespace).unwrap())
    }

    fn session(access: &str, refresh: &str) -> Session {
        Session::new(AccessToken::new(access), RefreshToken::new(refresh))
    }

    #[tokio::test]
    async fn empty_store_loads_none() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, "user");
        assert!(store.load().await.unwrap().is_none());
        assert!(store.saved_at().unwrap().is_none());
    }

    #[tokio::test]
    async fn save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, "user");

        let original = session("access-1", "refresh-1").with_scope_context(Some("42".into()));
        store.save(&original).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, original);
        assert_eq!(loaded.scope_context(), Some("42"));
        assert!(store.saved_at().unwrap().is_some());
    }

    #[tokio::test]
    async fn save_overwrites_previous_session() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, "user");

        store
            .save(&session("a1", "r1").with_scope_context(Some("1".into())))
            .await
            .unwrap();
        store.save(&session("a2", "r2")).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.access_token().as_str(), "a2");
        assert_eq!(loaded.refresh_token().as_str(), "r2");
        assert_eq!(loaded.scope_context(), None);
    }

    #[tokio::test]
    async fn clear_then_load_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, "user");

        store.save(&session("a", "r")).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());

        // Clearing twice is fine.
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn namespaces_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let admin = store(&dir, "admin");
        let user = store(&dir, "user");

        admin.save(&session("admin-a", "admin-r")).await.unwrap();
        user.save(&session("user-a", "user-r")).await.unwrap();
        admin.clear().await.unwrap();

        assert!(admin.load().await.unwrap().is_none());
        let loaded = user.load().await.unwrap().unwrap();
        assert_eq!(loaded.access_token().as_str(), "user-a");
    }

    #[tokio::test]
    async fn leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, "user");
        store.save(&session("a", "r")).await.unwrap();
        store.save(&session("b", "s")).await.unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path().join("user"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, "user");
        fs::create_dir_all(dir.path().join("user")).unwrap();
        fs::write(store.session_path(), "{not json").unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Corrupt { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn session_file_is_private() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, "user");
        store.save(&session("a", "r")).await.unwrap();

        let mode = fs::metadata(store.session_path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

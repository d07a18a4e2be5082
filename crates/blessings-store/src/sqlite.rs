//! SQLite implementation of the StateStore trait.
//!
//! This is the primary persistence backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::state::{PrincipalState, StorageKey};
use crate::traits::StateStore;

/// SQLite-based state store.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
#[derive(Clone)]
pub struct SqliteStateStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStateStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|e| {
                StoreError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                    Some(format!("mutex poisoned: {}", e)),
                ))
            })?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Io(e.into()))?
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn load_state(&self, key: &StorageKey) -> Result<Option<PrincipalState>> {
        let key = key.clone();

        self.blocking(move |conn| {
            let blob: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT state FROM principal_state WHERE key = ?1",
                    params![key.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            blob.map(|bytes| PrincipalState::from_bytes(&bytes))
                .transpose()
        })
        .await
    }

    async fn save_state(&self, key: &StorageKey, state: &PrincipalState) -> Result<()> {
        let key = key.clone();
        let version = state.version;
        let bytes = state.to_bytes()?;

        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO principal_state (key, version, state, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(key) DO UPDATE SET
                    version = excluded.version,
                    state = excluded.state,
                    updated_at = excluded.updated_at",
                params![key.as_str(), version, bytes, now_millis()],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete_state(&self, key: &StorageKey) -> Result<bool> {
        let key = key.clone();

        self.blocking(move |conn| {
            let removed = conn.execute(
                "DELETE FROM principal_state WHERE key = ?1",
                params![key.as_str()],
            )?;
            Ok(removed > 0)
        })
        .await
    }

    async fn list_keys(&self) -> Result<Vec<StorageKey>> {
        self.blocking(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM principal_state ORDER BY key")?;
            let keys = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .map(|key| key.map(StorageKey::from))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(keys)
        })
        .await
    }
}

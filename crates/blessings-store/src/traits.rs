//! StateStore trait: the abstract interface for principal persistence.
//!
//! Principals are storage-agnostic. Implementations include SQLite (primary)
//! and in-memory (for tests).

use async_trait::async_trait;

use crate::error::Result;
use crate::state::{PrincipalState, StorageKey};

/// Async interface for persisting principal state.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
///
/// Saving under an existing key replaces the previous state whole.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the state stored under `key`.
    async fn load_state(&self, key: &StorageKey) -> Result<Option<PrincipalState>>;

    /// Store `state` under `key`, replacing anything there.
    async fn save_state(&self, key: &StorageKey, state: &PrincipalState) -> Result<()>;

    /// Remove the state under `key`. Returns whether anything was removed.
    async fn delete_state(&self, key: &StorageKey) -> Result<bool>;

    /// All keys with stored state, sorted.
    async fn list_keys(&self) -> Result<Vec<StorageKey>>;
}

//! In-memory implementation of the StateStore trait.
//!
//! This is primarily for testing. State is kept in encoded form so it goes
//! through the same serialization as the SQLite backend.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::Result;
use crate::state::{PrincipalState, StorageKey};
use crate::traits::StateStore;

/// In-memory state store.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    inner: RwLock<HashMap<StorageKey, Vec<u8>>>,
}

impl MemoryStateStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the raw bytes under `key`.
    ///
    /// Lets tests simulate corrupted or tampered persistence.
    pub fn put_raw(&self, key: &StorageKey, bytes: Vec<u8>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), bytes);
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load_state(&self, key: &StorageKey) -> Result<Option<PrincipalState>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .get(key)
            .map(|bytes| PrincipalState::from_bytes(bytes))
            .transpose()
    }

    async fn save_state(&self, key: &StorageKey, state: &PrincipalState) -> Result<()> {
        let bytes = state.to_bytes()?;
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), bytes);
        Ok(())
    }

    async fn delete_state(&self, key: &StorageKey) -> Result<bool> {
        Ok(self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some())
    }

    async fn list_keys(&self) -> Result<Vec<StorageKey>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<StorageKey> = inner.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use blessings_core::{Blessings, Keypair};

    fn state_for(name: &str) -> PrincipalState {
        let kp = Keypair::from_seed(&[7; 32]);
        let mut state = PrincipalState::new();
        state.default_blessings = Blessings::bless_self(&kp, name, vec![]).unwrap();
        state
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = MemoryStateStore::new();
        let key = StorageKey::new("principal/abc");
        assert!(store.load_state(&key).await.unwrap().is_none());

        let state = state_for("alice");
        store.save_state(&key, &state).await.unwrap();
        assert_eq!(store.load_state(&key).await.unwrap(), Some(state));
    }

    #[tokio::test]
    async fn test_save_replaces() {
        let store = MemoryStateStore::new();
        let key = StorageKey::new("k");
        store.save_state(&key, &state_for("alice")).await.unwrap();
        store.save_state(&key, &state_for("bob")).await.unwrap();

        let loaded = store.load_state(&key).await.unwrap().unwrap();
        assert_eq!(loaded.default_blessings.unverified_names(), vec!["bob"]);
    }

    #[tokio::test]
    async fn test_delete_and_list() {
        let store = MemoryStateStore::new();
        store.save_state(&"b".into(), &PrincipalState::new()).await.unwrap();
        store.save_state(&"a".into(), &PrincipalState::new()).await.unwrap();

        assert_eq!(
            store.list_keys().await.unwrap(),
            vec![StorageKey::new("a"), StorageKey::new("b")]
        );
        assert!(store.delete_state(&"a".into()).await.unwrap());
        assert!(!store.delete_state(&"a".into()).await.unwrap());
        assert_eq!(store.list_keys().await.unwrap(), vec![StorageKey::new("b")]);
    }

    #[tokio::test]
    async fn test_corrupted_bytes() {
        let store = MemoryStateStore::new();
        let key = StorageKey::new("k");
        store.put_raw(&key, vec![0xff, 0x00]);
        assert!(matches!(
            store.load_state(&key).await,
            Err(StoreError::Serialization(_))
        ));
    }
}

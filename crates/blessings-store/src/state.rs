//! The persisted form of a principal's policy tables.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use blessings_core::{BlessingPattern, Blessings, PublicKey};

use crate::error::{Result, StoreError};

/// Current state format version.
pub const STATE_VERSION: u32 = 1;

/// Where a principal's state lives in a [`crate::StateStore`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StorageKey(String);

impl StorageKey {
    /// Wrap a key string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for StorageKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for StorageKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Snapshot of a principal's blessing store and trusted roots.
///
/// Blessings decoded from here have had their key invariant re-checked, but
/// nothing ties them to the loading principal yet; the caller must do that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalState {
    /// Format version.
    pub version: u32,

    /// Blessings to present to peers, by peer pattern.
    pub peer_blessings: BTreeMap<BlessingPattern, Blessings>,

    /// Blessings presented when nothing more specific applies.
    pub default_blessings: Blessings,

    /// Trusted root keys and the name-spaces they may vouch for.
    pub roots: BTreeMap<PublicKey, BTreeSet<BlessingPattern>>,
}

impl PrincipalState {
    /// An empty state at the current version.
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION,
            ..Default::default()
        }
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let state: Self =
            ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))?;
        if state.version == 0 || state.version > STATE_VERSION {
            return Err(StoreError::InvalidData(format!(
                "unsupported state version {}",
                state.version
            )));
        }
        Ok(state)
    }
}

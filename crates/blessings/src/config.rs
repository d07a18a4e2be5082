//! Principal configuration.

use blessings_core::PublicKey;
use blessings_store::StorageKey;

/// Default maximum number of certificates in an acceptable chain.
pub const DEFAULT_MAX_CHAIN_LENGTH: usize = 16;

/// Default namespace for persisted principal state.
pub const DEFAULT_STORAGE_NAMESPACE: &str = "principal";

/// Configuration for a [`crate::Principal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalConfig {
    /// Chains longer than this are rejected by `for_call` and cannot be
    /// produced by `bless`.
    pub max_chain_length: usize,
    /// Prefix of the key state is saved under.
    pub storage_namespace: String,
}

impl Default for PrincipalConfig {
    fn default() -> Self {
        Self {
            max_chain_length: DEFAULT_MAX_CHAIN_LENGTH,
            storage_namespace: DEFAULT_STORAGE_NAMESPACE.to_string(),
        }
    }
}

impl PrincipalConfig {
    /// Set the maximum chain length.
    pub fn with_max_chain_length(mut self, max_chain_length: usize) -> Self {
        self.max_chain_length = max_chain_length;
        self
    }

    /// Set the storage namespace.
    pub fn with_storage_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.storage_namespace = namespace.into();
        self
    }

    /// Where the state of the principal owning `public_key` is saved.
    pub fn storage_key(&self, public_key: &PublicKey) -> StorageKey {
        StorageKey::new(format!("{}/{}", self.storage_namespace, public_key.to_hex()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blessings_core::Keypair;

    #[test]
    fn test_defaults() {
        let config = PrincipalConfig::default();
        assert_eq!(config.max_chain_length, 16);
        assert_eq!(config.storage_namespace, "principal");
    }

    #[test]
    fn test_storage_key() {
        let key = Keypair::from_seed(&[1; 32]).public_key();
        let config = PrincipalConfig::default().with_storage_namespace("agents");
        assert_eq!(
            config.storage_key(&key).as_str(),
            format!("agents/{}", key.to_hex())
        );
    }
}

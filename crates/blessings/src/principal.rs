//! The Principal: a keypair plus its disclosure policy and trusted roots.
//!
//! A principal signs blessings for itself and others, decides which of its
//! blessings to present to a peer, and resolves blessings presented to it
//! into the names that are valid for a call.

use std::collections::BTreeSet;
use std::sync::Arc;

use blessings_caveats::{Call, CaveatRegistry};
use blessings_core::{
    validate_chain_structure, verify_chain_signatures, Blessings, Caveat, Chain, Error, Keypair,
    PublicKey, Signature, Signer,
};
use blessings_store::{PrincipalState, StateStore, StorageKey, STATE_VERSION};

use crate::blessing_store::BlessingStore;
use crate::config::PrincipalConfig;
use crate::error::{PrincipalError, Result};
use crate::roots::BlessingRoots;

/// An identity that issues, presents and verifies blessings.
pub struct Principal {
    /// The identity keypair.
    keypair: Keypair,
    /// Which blessings to present to which peer.
    store: BlessingStore,
    /// Which roots to trust for which names.
    roots: BlessingRoots,
    /// Validators for caveats found in presented chains.
    registry: Arc<CaveatRegistry>,
    /// Configuration.
    config: PrincipalConfig,
}

impl Principal {
    /// Create a principal with an empty store and no trusted roots.
    pub fn new(keypair: Keypair, registry: Arc<CaveatRegistry>, config: PrincipalConfig) -> Self {
        let store = BlessingStore::new(keypair.public_key());
        Self {
            keypair,
            store,
            roots: BlessingRoots::new(),
            registry,
            config,
        }
    }

    /// A principal with a fresh key, the shared registry and default config.
    pub fn generate() -> Self {
        Self::new(
            Keypair::generate(),
            CaveatRegistry::shared(),
            PrincipalConfig::default(),
        )
    }

    /// The principal's public key.
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// The disclosure policy.
    pub fn blessing_store(&self) -> &BlessingStore {
        &self.store
    }

    /// The trusted roots.
    pub fn roots(&self) -> &BlessingRoots {
        &self.roots
    }

    /// The caveat registry used by [`Principal::for_call`].
    pub fn registry(&self) -> &Arc<CaveatRegistry> {
        &self.registry
    }

    /// Configuration.
    pub fn config(&self) -> &PrincipalConfig {
        &self.config
    }

    /// Where this principal's state is saved.
    pub fn storage_key(&self) -> StorageKey {
        self.config.storage_key(&self.public_key())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Issuing
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a root blessing named `name` for this principal.
    pub fn bless_self(&self, name: &str, caveats: Vec<Caveat>) -> blessings_core::Result<Blessings> {
        if self.config.max_chain_length == 0 {
            return Err(Error::MalformedChain(
                "maximum chain length is zero".into(),
            ));
        }
        Blessings::bless_self(self, name, caveats)
    }

    /// Extend this principal's blessings `with` by `extension`, granting the
    /// result to `blessee`.
    pub fn bless(
        &self,
        blessee: PublicKey,
        with: &Blessings,
        extension: &str,
        caveats: Vec<Caveat>,
    ) -> blessings_core::Result<Blessings> {
        let max = self.config.max_chain_length;
        if let Some(chain) = with.chains().find(|chain| chain.len() >= max) {
            return Err(Error::MalformedChain(format!(
                "extending {} would exceed {} certificates",
                chain.name(),
                max
            )));
        }
        Blessings::bless(self, blessee, with, extension, caveats)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verifying
    // ─────────────────────────────────────────────────────────────────────────

    /// The names of every chain in `blessings` that is valid for `call`.
    ///
    /// Sorted and deduplicated. Invalid chains are dropped, never reported
    /// as errors; an empty result means nothing was valid.
    pub fn for_call(&self, blessings: &Blessings, call: &dyn Call) -> Vec<String> {
        let mut names = BTreeSet::new();
        for chain in blessings.chains() {
            match self.check_chain(chain, call) {
                Ok(()) => {
                    names.insert(chain.name());
                }
                Err(e) => {
                    tracing::debug!(
                        chain = %chain.id(),
                        name = %chain.name(),
                        reason = %e,
                        "rejected chain"
                    );
                }
            }
        }
        names.into_iter().collect()
    }

    /// Whether `chain` is valid for `call` under this principal's roots.
    pub fn chain_valid(&self, chain: &Chain, call: &dyn Call) -> bool {
        self.check_chain(chain, call).is_ok()
    }

    /// Like [`Principal::chain_valid`], but says why a chain is rejected.
    ///
    /// Checks, in order: length and name grammar, every caveat of every
    /// certificate, every signature, and finally the root.
    pub fn check_chain(&self, chain: &Chain, call: &dyn Call) -> blessings_core::Result<()> {
        validate_chain_structure(chain, self.config.max_chain_length)?;
        for cert in chain.certificates() {
            self.registry.validate_all(call, &cert.caveats)?;
        }
        verify_chain_signatures(chain)?;
        self.roots.recognized(chain.root_key(), &chain.name())
    }

    /// Trust the root of every chain in `blessings` for its own name-space.
    ///
    /// A chain rooted at `alice` makes its root key trusted for `alice/...`.
    pub fn add_to_roots(&self, blessings: &Blessings) -> blessings_core::Result<()> {
        for chain in blessings.chains() {
            let root_name = &chain.first().extension;
            self.roots
                .add(chain.root_key(), &format!("{}/...", root_name))?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Save the blessing store and roots under [`Principal::storage_key`].
    pub async fn save<S: StateStore + ?Sized>(&self, state_store: &S) -> Result<()> {
        let (peer_blessings, default_blessings) = self.store.dump();
        let state = PrincipalState {
            version: STATE_VERSION,
            peer_blessings,
            default_blessings,
            roots: self.roots.dump(),
        };

        state_store.save_state(&self.storage_key(), &state).await?;
        tracing::debug!(key = %self.storage_key(), "saved principal state");
        Ok(())
    }

    /// Restore a principal saved with [`Principal::save`].
    ///
    /// Every persisted blessing must be bound to `keypair`'s public key.
    pub async fn load<S: StateStore + ?Sized>(
        keypair: Keypair,
        registry: Arc<CaveatRegistry>,
        config: PrincipalConfig,
        state_store: &S,
    ) -> Result<Self> {
        let public_key = keypair.public_key();
        let key = config.storage_key(&public_key);
        let state = state_store
            .load_state(&key)
            .await?
            .ok_or_else(|| PrincipalError::NotFound(key.clone()))?;

        let store =
            BlessingStore::restore(public_key, state.peer_blessings, state.default_blessings)
                .map_err(|e| {
                    tracing::warn!(%key, error = %e, "persisted blessings do not belong to principal");
                    e
                })?;

        Ok(Self {
            keypair,
            store,
            roots: BlessingRoots::restore(state.roots),
            registry,
            config,
        })
    }
}

impl Signer for Principal {
    fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    fn sign(&self, message: &[u8]) -> Signature {
        self.keypair.sign(message)
    }
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("public_key", &self.public_key())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Resolve blessings from the verifier's side.
pub trait BlessingsExt {
    /// The names valid for `call` as judged by `verifier`.
    fn for_call(&self, call: &dyn Call, verifier: &Principal) -> Vec<String>;
}

impl BlessingsExt for Blessings {
    fn for_call(&self, call: &dyn Call, verifier: &Principal) -> Vec<String> {
        verifier.for_call(self, call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blessings_caveats::CallParams;
    use blessings_store::MemoryStateStore;

    fn principal(seed: u8) -> Principal {
        Principal::new(
            Keypair::from_seed(&[seed; 32]),
            Arc::new(CaveatRegistry::with_builtins()),
            PrincipalConfig::default(),
        )
    }

    #[test]
    fn test_self_blessing_needs_trusted_root() {
        let alice = principal(1);
        let b = alice.bless_self("alice", vec![]).unwrap();
        let call = CallParams::new().method("Get");

        assert!(alice.for_call(&b, &call).is_empty());
        alice.add_to_roots(&b).unwrap();
        assert_eq!(alice.for_call(&b, &call), vec!["alice"]);
        assert_eq!(b.for_call(&call, &alice), vec!["alice"]);
    }

    #[test]
    fn test_bless_enforces_max_chain_length() {
        let config = PrincipalConfig::default().with_max_chain_length(2);
        let alice = Principal::new(
            Keypair::from_seed(&[1; 32]),
            Arc::new(CaveatRegistry::with_builtins()),
            config.clone(),
        );
        let bob = Principal::new(
            Keypair::from_seed(&[2; 32]),
            Arc::new(CaveatRegistry::with_builtins()),
            config,
        );

        let root = alice.bless_self("alice", vec![]).unwrap();
        let to_bob = alice.bless(bob.public_key(), &root, "bob", vec![]).unwrap();
        assert!(matches!(
            bob.bless(alice.public_key(), &to_bob, "back", vec![]),
            Err(Error::MalformedChain(_))
        ));
    }

    #[test]
    fn test_check_chain_reports_reason() {
        let alice = principal(1);
        let b = alice.bless_self("alice", vec![Caveat::method(["Get"])]).unwrap();
        let chain = b.chains().next().unwrap();
        alice.add_to_roots(&b).unwrap();

        assert!(alice.chain_valid(chain, &CallParams::new().method("Get")));
        assert!(matches!(
            alice.check_chain(chain, &CallParams::new().method("Put")),
            Err(Error::CaveatValidationFailed { .. })
        ));
    }

    #[test]
    fn test_signer_matches_keypair() {
        let alice = principal(1);
        let sig = Signer::sign(&alice, b"msg");
        alice.public_key().verify(b"msg", &sig).unwrap();
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let alice = principal(1);
        let b = alice.bless_self("alice", vec![]).unwrap();
        alice.blessing_store().set(b.clone(), "...").unwrap();
        alice.blessing_store().set_default_blessings(b.clone()).unwrap();
        alice.add_to_roots(&b).unwrap();

        let states = MemoryStateStore::new();
        alice.save(&states).await.unwrap();

        let loaded = Principal::load(
            Keypair::from_seed(&[1; 32]),
            Arc::new(CaveatRegistry::with_builtins()),
            PrincipalConfig::default(),
            &states,
        )
        .await
        .unwrap();

        assert_eq!(loaded.blessing_store().peer_blessings(), alice.blessing_store().peer_blessings());
        assert_eq!(loaded.blessing_store().default_blessings(), b);
        assert_eq!(loaded.roots().dump(), alice.roots().dump());
    }

    #[tokio::test]
    async fn test_load_missing() {
        let states = MemoryStateStore::new();
        let result = Principal::load(
            Keypair::from_seed(&[1; 32]),
            CaveatRegistry::shared(),
            PrincipalConfig::default(),
            &states,
        )
        .await;
        assert!(matches!(result, Err(PrincipalError::NotFound(_))));
    }
}

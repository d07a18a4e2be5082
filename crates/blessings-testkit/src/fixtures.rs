//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use blessings::{Principal, PrincipalConfig};
use blessings_caveats::{CallParams, CaveatRegistry};
use blessings_core::{Blessings, Caveat, Keypair, PublicKey};
use blessings_store::MemoryStateStore;

/// One hour in milliseconds.
pub const HOUR_MS: i64 = 3_600_000;

/// A test fixture with a principal and an in-memory state store.
pub struct TestFixture {
    pub principal: Principal,
    pub state_store: MemoryStateStore,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self::from_keypair(Keypair::generate())
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::from_keypair(Keypair::from_seed(&seed))
    }

    fn from_keypair(keypair: Keypair) -> Self {
        Self {
            principal: Principal::new(
                keypair,
                Arc::new(CaveatRegistry::with_builtins()),
                PrincipalConfig::default(),
            ),
            state_store: MemoryStateStore::new(),
        }
    }

    /// The principal's public key.
    pub fn public_key(&self) -> PublicKey {
        self.principal.public_key()
    }

    /// Bless the principal as `name` and trust itself for that name-space.
    pub fn trusted_self_blessing(&self, name: &str, caveats: Vec<Caveat>) -> Blessings {
        let blessings = self
            .principal
            .bless_self(name, caveats)
            .unwrap_or_else(|e| panic!("bless_self({:?}) failed: {}", name, e));
        self.principal
            .add_to_roots(&blessings)
            .unwrap_or_else(|e| panic!("add_to_roots failed: {}", e));
        blessings
    }

    /// Names this principal accepts from `blessings` for `call`.
    pub fn names_for(&self, blessings: &Blessings, call: &CallParams) -> Vec<String> {
        self.principal.for_call(blessings, call)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-principal tests.
pub fn multi_principal_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[31] = 0xb1;
            TestFixture::with_seed(seed)
        })
        .collect()
}

/// A call to `method` made now.
pub fn call(method: &str) -> CallParams {
    call_at(method, now_millis())
}

/// A call to `method` made at `timestamp` (Unix ms).
pub fn call_at(method: &str, timestamp: i64) -> CallParams {
    CallParams::new().method(method).timestamp(timestamp)
}

/// Get current time in milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

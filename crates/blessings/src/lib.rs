//! # Blessings
//!
//! Hierarchical, delegable, caveated credentials bound to public keys.
//!
//! ## Overview
//!
//! A principal blesses itself with a root name (`alice`) and extends that
//! blessing to others (`alice/friend`), attaching caveats that must hold at
//! call time. On each call:
//!
//! - the **sender** asks its [`BlessingStore`] which blessings to present to
//!   the peer (`for_peer`);
//! - the **receiver** resolves the presented blessings against the call
//!   (`for_call`), keeping only chains whose caveats hold, whose signatures
//!   verify, and whose root it trusts through its [`BlessingRoots`].
//!
//! ## Usage
//!
//! ```rust
//! use blessings::{Principal, CallParams, Caveat};
//!
//! let alice = Principal::generate();
//! let bob = Principal::generate();
//!
//! let root = alice.bless_self("alice", vec![]).unwrap();
//! let friend = alice
//!     .bless(bob.public_key(), &root, "friend", vec![Caveat::method(["Get"])])
//!     .unwrap();
//!
//! // Bob trusts alice for names under "alice".
//! bob.add_to_roots(&root).unwrap();
//!
//! let call = CallParams::new().method("Get");
//! assert_eq!(bob.for_call(&friend, &call), vec!["alice/friend"]);
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `blessings::core` - Keys, patterns, caveats, certificates, chains
//! - `blessings::caveats` - Call context and the caveat registry
//! - `blessings::store` - Persistence of principal state

pub mod blessing_store;
pub mod config;
pub mod error;
pub mod principal;
pub mod roots;

// Re-export component crates
pub use blessings_caveats as caveats;
pub use blessings_core as core;
pub use blessings_store as store;

// Re-export main types for convenience
pub use blessing_store::BlessingStore;
pub use config::PrincipalConfig;
pub use error::{PrincipalError, Result};
pub use principal::{BlessingsExt, Principal};
pub use roots::BlessingRoots;

// Re-export commonly used types
pub use blessings_caveats::{Call, CallParams, CaveatRegistry, CaveatValidator};
pub use blessings_core::{
    union_of_blessings, BlessingPattern, Blessings, Caveat, CaveatId, Chain, Error, Keypair,
    PublicKey, Signer,
};

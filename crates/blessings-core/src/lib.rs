//! # Blessings Core
//!
//! Pure primitives for blessings: keys, names, patterns, caveats, and
//! certificate chains.
//!
//! This crate contains no I/O and no shared state. It is pure computation
//! over signed data structures.
//!
//! ## Key Types
//!
//! - [`Blessings`] - An immutable set of chains bound to one public key
//! - [`Chain`] / [`Certificate`] - Signed delegation links
//! - [`BlessingPattern`] - Wildcard matcher over blessing names
//! - [`Caveat`] - A condition attached to a certificate
//! - [`Keypair`] / [`PublicKey`] / [`Signer`] - Ed25519 identity
//!
//! ## Signing
//!
//! Certificates are signed over deterministic CBOR. See [`canonical`] module.

pub mod blessings;
pub mod canonical;
pub mod caveat;
pub mod certificate;
pub mod crypto;
pub mod error;
pub mod name;
pub mod pattern;
pub mod types;
pub mod validation;

pub use blessings::{union_of_blessings, Blessings};
pub use canonical::{certificate_content_bytes, signed_message, SIGN_DOMAIN};
pub use caveat::{Caveat, CaveatPayload, EXPIRY_CAVEAT, METHOD_CAVEAT, UNCONSTRAINED_CAVEAT};
pub use certificate::{Certificate, CertificateBuilder, Chain};
pub use crypto::{Blake3Hash, Keypair, PublicKey, Signature, Signer};
pub use error::{Error, Result};
pub use pattern::BlessingPattern;
pub use types::{CaveatId, ChainId};
pub use validation::{validate_chain, validate_chain_structure, verify_chain_signatures};

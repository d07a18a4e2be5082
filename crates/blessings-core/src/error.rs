//! Error types for blessings.
//!
//! A single tagged error covers every failure the subsystem can report.
//! Chain-level failures ([`Error::UnrecognizedCaveat`],
//! [`Error::CaveatValidationFailed`], [`Error::UntrustedRoot`]) are produced
//! while validating individual chains but never escape `for_call`.

use thiserror::Error;

use crate::crypto::PublicKey;
use crate::types::CaveatId;

/// Errors that can occur while issuing, storing, or validating blessings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid blessing pattern {pattern:?}: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },

    #[error("invalid blessing name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("public key mismatch: expected {expected}, got {actual}")]
    KeyMismatch {
        expected: PublicKey,
        actual: PublicKey,
    },

    #[error("no blessings to extend")]
    EmptyBlessings,

    #[error("caveat {0} is already registered with a different validator")]
    DuplicateCaveatRegistration(CaveatId),

    #[error("unrecognized caveat {0}")]
    UnrecognizedCaveat(CaveatId),

    #[error("caveat {id} failed validation: {reason}")]
    CaveatValidationFailed { id: CaveatId, reason: String },

    #[error("root key {root} is not recognized for {name:?}")]
    UntrustedRoot { root: PublicKey, name: String },

    #[error("malformed chain: {0}")]
    MalformedChain(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),
}

/// Result type for blessings operations.
pub type Result<T> = std::result::Result<T, Error>;

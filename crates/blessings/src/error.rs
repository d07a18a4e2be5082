//! Error types for principals.

use blessings_store::{StorageKey, StoreError};
use thiserror::Error;

/// Errors from principal-level operations that touch persistence.
#[derive(Debug, Error)]
pub enum PrincipalError {
    /// Blessing, pattern or caveat error.
    #[error("blessings error: {0}")]
    Blessings(#[from] blessings_core::Error),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Nothing saved under the principal's key.
    #[error("no saved state at {0}")]
    NotFound(StorageKey),
}

/// Result type for principal operations.
pub type Result<T> = std::result::Result<T, PrincipalError>;

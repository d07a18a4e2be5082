//! # Blessings Store
//!
//! Persistence for principal policy state. Provides a trait-based interface
//! with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! A principal's blessing store and trusted roots are snapshotted into a
//! [`PrincipalState`] and saved under a [`StorageKey`] through the
//! [`StateStore`] trait. The primary implementation is [`SqliteStateStore`],
//! with [`MemoryStateStore`] for testing.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use blessings_store::{PrincipalState, SqliteStateStore, StateStore, StorageKey};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStateStore::open("principals.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStateStore::open_memory().unwrap();
//!
//!     let key = StorageKey::new("principal/0123abcd");
//!     store.save_state(&key, &PrincipalState::new()).await.unwrap();
//!     let state = store.load_state(&key).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Whole-state saves**: a save replaces everything stored under the key
//! - **CBOR encoding**: both backends store the same encoded bytes
//! - **No trust in storage**: decoded blessings are re-checked by their owner

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod state;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStateStore;
pub use sqlite::SqliteStateStore;
pub use state::{PrincipalState, StorageKey, STATE_VERSION};
pub use traits::StateStore;

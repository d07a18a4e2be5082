//! Per-principal disclosure policy: which blessings to present to which peer.
//!
//! The table is a copy-on-write snapshot. Readers clone the current `Arc` and
//! drop the lock; writers build a new table and swap it in. A reader therefore
//! sees either the old table or the new one, never a mix.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use blessings_core::{BlessingPattern, Blessings, Error, PublicKey, Result};

#[derive(Debug, Clone, Default)]
struct Table {
    entries: BTreeMap<BlessingPattern, Blessings>,
    default: Blessings,
}

/// Maps peer patterns to the blessings presented to matching peers.
///
/// Every stored value is bound to the owner's key.
#[derive(Debug)]
pub struct BlessingStore {
    public_key: PublicKey,
    table: RwLock<Arc<Table>>,
}

impl BlessingStore {
    /// An empty store for the principal owning `public_key`.
    pub fn new(public_key: PublicKey) -> Self {
        Self {
            public_key,
            table: RwLock::new(Arc::new(Table::default())),
        }
    }

    /// Rebuild a store from persisted parts, re-checking every key.
    pub fn restore(
        public_key: PublicKey,
        entries: BTreeMap<BlessingPattern, Blessings>,
        default: Blessings,
    ) -> Result<Self> {
        for blessings in entries.values().chain(std::iter::once(&default)) {
            check_owner(&public_key, blessings)?;
        }
        let entries = entries
            .into_iter()
            .filter(|(_, blessings)| !blessings.is_empty())
            .collect();

        Ok(Self {
            public_key,
            table: RwLock::new(Arc::new(Table { entries, default })),
        })
    }

    /// The owner's key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Present `blessings` to peers matching `pattern`.
    ///
    /// Replaces any entry for the same pattern and returns it. Empty
    /// blessings remove the entry. On error the store is unchanged.
    pub fn set(&self, blessings: Blessings, pattern: &str) -> Result<Option<Blessings>> {
        let pattern = BlessingPattern::new(pattern)?;
        check_owner(&self.public_key, &blessings)?;

        let previous = self.update(|table| {
            if blessings.is_empty() {
                table.entries.remove(&pattern)
            } else {
                table.entries.insert(pattern.clone(), blessings)
            }
        });
        tracing::debug!(owner = %self.public_key, %pattern, "updated peer blessings");
        Ok(previous)
    }

    /// The blessings to present to a peer claiming `peer_names`.
    ///
    /// The union of every entry whose pattern matches one of the names, plus
    /// the `...` entry if there is one.
    pub fn for_peer<S: AsRef<str>>(&self, peer_names: &[S]) -> Blessings {
        let table = self.snapshot();
        let matching = table
            .entries
            .iter()
            .filter(|(pattern, _)| pattern.is_all() || pattern.matches_any(peer_names))
            .map(|(_, blessings)| blessings);

        // All entries share the owner's key, so the union cannot fail.
        Blessings::union(matching).unwrap_or_else(|e| {
            tracing::warn!(owner = %self.public_key, error = %e, "inconsistent blessing store");
            Blessings::empty()
        })
    }

    /// The default blessings; empty if never set.
    pub fn default_blessings(&self) -> Blessings {
        self.snapshot().default.clone()
    }

    /// Replace the default blessings.
    pub fn set_default_blessings(&self, blessings: Blessings) -> Result<()> {
        check_owner(&self.public_key, &blessings)?;
        self.update(|table| table.default = blessings);
        tracing::debug!(owner = %self.public_key, "updated default blessings");
        Ok(())
    }

    /// All entries, by pattern.
    pub fn peer_blessings(&self) -> BTreeMap<BlessingPattern, Blessings> {
        self.snapshot().entries.clone()
    }

    /// Entries and default from one consistent snapshot.
    pub fn dump(&self) -> (BTreeMap<BlessingPattern, Blessings>, Blessings) {
        let table = self.snapshot();
        (table.entries.clone(), table.default.clone())
    }

    fn snapshot(&self) -> Arc<Table> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update<T>(&self, f: impl FnOnce(&mut Table) -> T) -> T {
        let mut guard = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Table::clone(&guard);
        let out = f(&mut next);
        *guard = Arc::new(next);
        out
    }
}

fn check_owner(owner: &PublicKey, blessings: &Blessings) -> Result<()> {
    match blessings.public_key() {
        Some(key) if key != owner => Err(Error::KeyMismatch {
            expected: *owner,
            actual: *key,
        }),
        _ => Ok(()),
    }
}

impl fmt::Display for BlessingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.snapshot();
        writeln!(f, "Default Blessings      {}", table.default)?;
        writeln!(f, "Peer pattern           Blessings")?;
        for (pattern, blessings) in &table.entries {
            writeln!(f, "{:<22} {}", pattern.as_str(), blessings)?;
        }
        Ok(())
    }
}

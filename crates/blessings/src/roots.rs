//! Per-principal trust table: which root keys may vouch for which names.
//!
//! Same copy-on-write scheme as [`crate::BlessingStore`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use blessings_core::{BlessingPattern, Error, PublicKey, Result};

type TrustTable = BTreeMap<PublicKey, BTreeSet<BlessingPattern>>;

/// Trusted root keys and the name-spaces each may issue.
#[derive(Debug, Default)]
pub struct BlessingRoots {
    table: RwLock<Arc<TrustTable>>,
}

impl BlessingRoots {
    /// No trusted roots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted dump.
    pub fn restore(table: BTreeMap<PublicKey, BTreeSet<BlessingPattern>>) -> Self {
        let table = table
            .into_iter()
            .filter(|(_, patterns)| !patterns.is_empty())
            .collect();
        Self {
            table: RwLock::new(Arc::new(table)),
        }
    }

    /// Trust `root` for names matching `pattern`.
    ///
    /// Additive: adding the same pair twice stores it once.
    pub fn add(&self, root: &PublicKey, pattern: &str) -> Result<()> {
        self.add_pattern(root, BlessingPattern::new(pattern)?);
        Ok(())
    }

    /// Trust `root` for names matching an already parsed pattern.
    pub fn add_pattern(&self, root: &PublicKey, pattern: BlessingPattern) {
        let mut guard = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if guard.get(root).is_some_and(|patterns| patterns.contains(&pattern)) {
            return;
        }

        tracing::debug!(%root, %pattern, "trusting root");
        let mut next = TrustTable::clone(&guard);
        next.entry(*root).or_default().insert(pattern);
        *guard = Arc::new(next);
    }

    /// Succeeds iff some pattern trusted for `root` matches `name`.
    pub fn recognized(&self, root: &PublicKey, name: &str) -> Result<()> {
        let table = self.snapshot();
        let trusted = table
            .get(root)
            .is_some_and(|patterns| patterns.iter().any(|p| p.matches(name)));

        if trusted {
            Ok(())
        } else {
            Err(Error::UntrustedRoot {
                root: *root,
                name: name.to_string(),
            })
        }
    }

    /// A consistent copy of the whole table.
    pub fn dump(&self) -> BTreeMap<PublicKey, BTreeSet<BlessingPattern>> {
        TrustTable::clone(&self.snapshot())
    }

    fn snapshot(&self) -> Arc<TrustTable> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl fmt::Display for BlessingRoots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (root, patterns) in self.snapshot().iter() {
            let patterns: Vec<&str> = patterns.iter().map(BlessingPattern::as_str).collect();
            writeln!(f, "{}: [{}]", root.to_hex(), patterns.join(", "))?;
        }
        Ok(())
    }
}

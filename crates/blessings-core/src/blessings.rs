//! Blessings: a set of certificate chains bound to one public key.
//!
//! A `Blessings` value is created once by [`Blessings::bless_self`],
//! [`Blessings::bless`], or [`Blessings::union`] and never mutated. Chains are
//! kept in a map keyed by [`ChainId`], so equality is set equality and
//! identical chains are stored once.
//!
//! The empty value carries no key. Every non-empty value carries exactly one,
//! and every chain's terminal key equals it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::caveat::Caveat;
use crate::certificate::{CertificateBuilder, Chain};
use crate::crypto::{PublicKey, Signer};
use crate::error::{Error, Result};
use crate::name::validate_name;
use crate::types::ChainId;

/// An immutable set of chains bound to one public key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireBlessings", into = "WireBlessings")]
pub struct Blessings {
    public_key: Option<PublicKey>,
    chains: BTreeMap<ChainId, Chain>,
}

#[derive(Serialize, Deserialize)]
struct WireBlessings {
    public_key: Option<PublicKey>,
    chains: Vec<Chain>,
}

impl Blessings {
    /// The empty value.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from chains, checking that every chain ends at `public_key`.
    ///
    /// An empty chain list yields the empty value.
    pub fn from_chains(public_key: PublicKey, chains: impl IntoIterator<Item = Chain>) -> Result<Self> {
        let mut set = BTreeMap::new();
        for chain in chains {
            if chain.terminal_key() != &public_key {
                return Err(Error::KeyMismatch {
                    expected: public_key,
                    actual: *chain.terminal_key(),
                });
            }
            set.insert(chain.id(), chain);
        }

        if set.is_empty() {
            return Ok(Self::empty());
        }
        Ok(Self {
            public_key: Some(public_key),
            chains: set,
        })
    }

    /// Create a root blessing: one chain with one self-signed certificate.
    pub fn bless_self(
        signer: &(impl Signer + ?Sized),
        name: &str,
        caveats: Vec<Caveat>,
    ) -> Result<Self> {
        validate_name(name)?;
        let key = signer.public_key();
        let cert = CertificateBuilder::new(name, key)
            .caveats(caveats)
            .sign(signer, None);
        Self::from_chains(key, [Chain::root(cert)])
    }

    /// Extend every chain of `with` by `extension`, granting it to `blessee`.
    ///
    /// `with` must be bound to the signer's own key.
    pub fn bless(
        signer: &(impl Signer + ?Sized),
        blessee: PublicKey,
        with: &Blessings,
        extension: &str,
        caveats: Vec<Caveat>,
    ) -> Result<Self> {
        validate_name(extension)?;

        let signer_key = signer.public_key();
        let with_key = with.public_key.ok_or(Error::EmptyBlessings)?;
        if with_key != signer_key {
            return Err(Error::KeyMismatch {
                expected: signer_key,
                actual: with_key,
            });
        }

        let chains = with.chains().map(|chain| {
            let cert = CertificateBuilder::new(extension, blessee)
                .caveats(caveats.iter().cloned())
                .sign(signer, Some(chain.last()));
            chain.extend(cert)
        });
        Self::from_chains(blessee, chains)
    }

    /// Set union of the chains of all operands.
    ///
    /// Empty operands are ignored; all others must share one key.
    pub fn union<'a>(blessings: impl IntoIterator<Item = &'a Blessings>) -> Result<Self> {
        let mut key: Option<PublicKey> = None;
        let mut chains = BTreeMap::new();

        for b in blessings {
            let Some(k) = b.public_key else {
                continue;
            };
            match key {
                None => key = Some(k),
                Some(expected) if expected != k => {
                    return Err(Error::KeyMismatch {
                        expected,
                        actual: k,
                    })
                }
                Some(_) => {}
            }
            chains.extend(b.chains.iter().map(|(id, chain)| (*id, chain.clone())));
        }

        Ok(Self {
            public_key: key,
            chains,
        })
    }

    /// The key every chain is bound to, or `None` when empty.
    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }

    /// The chains, in ChainId order.
    pub fn chains(&self) -> impl Iterator<Item = &Chain> {
        self.chains.values()
    }

    /// Number of distinct chains.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// True iff there are no chains.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Names of all chains, sorted and deduplicated, with no validation.
    ///
    /// Only for display and introspection; authorization must use the names
    /// a principal returns from `for_call`.
    pub fn unverified_names(&self) -> Vec<String> {
        self.chains()
            .map(Chain::name)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| Error::Encoding(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize from CBOR bytes, re-checking the key invariant.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| Error::Decoding(e.to_string()))
    }
}

/// Set union of several blessings bound to the same key.
pub fn union_of_blessings(blessings: &[Blessings]) -> Result<Blessings> {
    Blessings::union(blessings)
}

impl TryFrom<WireBlessings> for Blessings {
    type Error = Error;

    fn try_from(wire: WireBlessings) -> Result<Self> {
        match wire.public_key {
            Some(key) => Self::from_chains(key, wire.chains),
            None if wire.chains.is_empty() => Ok(Self::empty()),
            None => Err(Error::MalformedChain("chains without a public key".into())),
        }
    }
}

impl From<Blessings> for WireBlessings {
    fn from(b: Blessings) -> Self {
        Self {
            public_key: b.public_key,
            chains: b.chains.into_values().collect(),
        }
    }
}

impl fmt::Display for Blessings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unverified_names().join(","))
    }
}

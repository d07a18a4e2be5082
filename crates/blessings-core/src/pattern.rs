//! Blessing patterns: wildcard-capable matchers over blessing names.
//!
//! Grammar, on top of the name grammar in [`crate::name`]:
//!
//! - `...` matches every name.
//! - `a/b` matches exactly `a/b`.
//! - `a/b/...` matches `a/b` and every extension of it (`a/b/c`, ...).
//! - `a/b/$` matches exactly `a/b` and forbids extension.
//!
//! Patterns are parsed once on construction; matching never re-parses.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::name::{self, ANCHOR, CHAIN_SEPARATOR, WILDCARD};

/// How a pattern treats names that extend its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminal {
    /// Name must equal the components.
    Exact,
    /// Trailing `...`: name equals or extends the components.
    Wildcard,
    /// Trailing `$`: name equals the components, no extension allowed.
    Anchor,
}

/// A validated blessing pattern.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlessingPattern {
    raw: String,
    components: Vec<String>,
    terminal: Terminal,
}

impl BlessingPattern {
    /// Parse and validate a pattern.
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let raw = pattern.into();
        match parse(&raw) {
            Ok((components, terminal)) => Ok(Self {
                raw,
                components,
                terminal,
            }),
            Err(reason) => Err(Error::InvalidPattern {
                pattern: raw,
                reason,
            }),
        }
    }

    /// The pattern `...`, matched by every name.
    pub fn all() -> Self {
        Self {
            raw: WILDCARD.to_string(),
            components: Vec::new(),
            terminal: Terminal::Wildcard,
        }
    }

    /// Check whether a string is a valid pattern.
    pub fn is_valid(pattern: &str) -> bool {
        parse(pattern).is_ok()
    }

    /// Get the pattern string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this pattern matches every name.
    pub fn is_all(&self) -> bool {
        self.terminal == Terminal::Wildcard && self.components.is_empty()
    }

    /// Check whether `name` is matched by this pattern.
    pub fn matches(&self, name: &str) -> bool {
        let mut parts = name.split(CHAIN_SEPARATOR);
        for component in &self.components {
            match parts.next() {
                Some(part) if part == component => {}
                _ => return false,
            }
        }
        match self.terminal {
            Terminal::Wildcard => true,
            Terminal::Exact | Terminal::Anchor => parts.next().is_none(),
        }
    }

    /// Check whether any of `names` is matched by this pattern.
    pub fn matches_any<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|name| self.matches(name.as_ref()))
    }

    /// The anchored form of this pattern (`a/b` becomes `a/b/$`).
    ///
    /// Wildcard and already anchored patterns are returned unchanged.
    pub fn make_non_extendable(&self) -> Self {
        match self.terminal {
            Terminal::Exact => Self {
                raw: name::join(&self.raw, ANCHOR),
                components: self.components.clone(),
                terminal: Terminal::Anchor,
            },
            Terminal::Wildcard | Terminal::Anchor => self.clone(),
        }
    }
}

fn parse(pattern: &str) -> std::result::Result<(Vec<String>, Terminal), &'static str> {
    if pattern.is_empty() {
        return Err("empty pattern");
    }

    let mut parts: Vec<&str> = pattern.split(CHAIN_SEPARATOR).collect();
    let terminal = match parts.last().copied() {
        Some(WILDCARD) => {
            parts.pop();
            Terminal::Wildcard
        }
        Some(ANCHOR) => {
            parts.pop();
            if parts.is_empty() {
                return Err("anchor must follow a name");
            }
            Terminal::Anchor
        }
        _ => Terminal::Exact,
    };

    for part in &parts {
        name::validate_component(part)?;
    }

    Ok((parts.into_iter().map(String::from).collect(), terminal))
}

// Components and terminal are derived from `raw`, so identity is the string.
impl PartialEq for BlessingPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for BlessingPattern {}

impl Hash for BlessingPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl PartialOrd for BlessingPattern {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BlessingPattern {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl fmt::Debug for BlessingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlessingPattern({:?})", self.raw)
    }
}

impl fmt::Display for BlessingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for BlessingPattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for BlessingPattern {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for BlessingPattern {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl From<BlessingPattern> for String {
    fn from(pattern: BlessingPattern) -> Self {
        pattern.raw
    }
}

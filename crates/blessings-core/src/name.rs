//! Blessing name grammar.
//!
//! A blessing name is a `/`-separated list of components. Components are
//! non-empty, never contain the reserved sequence `...`, are never the
//! reserved anchor `$` or the path segments `.` and `..`, and contain no
//! whitespace, control characters, or `,`.

use crate::error::{Error, Result};

/// Separator between name components.
pub const CHAIN_SEPARATOR: char = '/';

/// Pattern component matching any extension.
pub const WILDCARD: &str = "...";

/// Pattern component forbidding further extension.
pub const ANCHOR: &str = "$";

/// Check a single name component, returning the reason it is invalid.
pub fn validate_component(component: &str) -> std::result::Result<(), &'static str> {
    if component.is_empty() {
        return Err("empty component");
    }
    if component.contains(WILDCARD) {
        return Err("component contains reserved sequence \"...\"");
    }
    if component == "." || component == ".." {
        return Err("component is a relative path segment");
    }
    if component == ANCHOR {
        return Err("component is the reserved anchor \"$\"");
    }
    if component
        .chars()
        .any(|c| c.is_control() || c.is_whitespace() || c == ',')
    {
        return Err("component contains a forbidden character");
    }
    Ok(())
}

/// Validate a full blessing name (or a multi-component extension).
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidName {
            name: String::new(),
            reason: "empty name",
        });
    }
    for component in name.split(CHAIN_SEPARATOR) {
        validate_component(component).map_err(|reason| Error::InvalidName {
            name: name.to_string(),
            reason,
        })?;
    }
    Ok(())
}

/// Join two names with the chain separator.
pub fn join(prefix: &str, extension: &str) -> String {
    let mut name = String::with_capacity(prefix.len() + 1 + extension.len());
    name.push_str(prefix);
    name.push(CHAIN_SEPARATOR);
    name.push_str(extension);
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["alice", "alice/work", "alice/work/friend", "a-b_c.d", "ü"] {
            assert!(validate_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in [
            "", "/", "/alice", "alice/", "alice//bob", "...", "alice/...", "a...b", "$",
            "alice/$", "al ice", "al,ice", "al\tice", ".", "..", "alice/./bob", "al/../ice",
        ] {
            assert!(
                matches!(validate_name(name), Err(Error::InvalidName { .. })),
                "{name:?} should be invalid"
            );
        }
    }

    #[test]
    fn test_dollar_inside_component_is_allowed() {
        assert!(validate_component("a$b").is_ok());
    }

    #[test]
    fn test_join() {
        assert_eq!(join("alice", "work/friend"), "alice/work/friend");
    }
}

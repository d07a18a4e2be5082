//! Proptest generators for property-based testing.

use proptest::prelude::*;

use blessings_core::{BlessingPattern, Caveat, Keypair, PublicKey};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random public key.
pub fn public_key() -> impl Strategy<Value = PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate a single valid name component.
pub fn name_component() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9_.@:-]{0,11}"
        .prop_filter("components may not contain \"...\"", |c| !c.contains("..."))
}

/// Generate a valid blessing name of 1 to `max_components` components.
pub fn blessing_name(max_components: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(name_component(), 1..=max_components.max(1))
        .prop_map(|components| components.join("/"))
}

/// Generate a valid pattern: a name, optionally wildcarded or anchored.
pub fn blessing_pattern() -> impl Strategy<Value = BlessingPattern> {
    prop_oneof![
        Just("...".to_string()),
        blessing_name(4),
        blessing_name(4).prop_map(|n| format!("{}/...", n)),
        blessing_name(4).prop_map(|n| format!("{}/$", n)),
    ]
    .prop_filter_map("valid pattern", |p| BlessingPattern::new(p).ok())
}

/// Generate a call timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=4_000_000_000_000i64
}

/// Generate a method name.
pub fn method() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z]{0,9}".prop_map(String::from)
}

/// Generate one of the built-in caveats.
pub fn builtin_caveat() -> impl Strategy<Value = Caveat> {
    prop_oneof![
        Just(Caveat::unconstrained()),
        prop::collection::vec(method(), 0..4).prop_map(Caveat::method),
        timestamp().prop_map(Caveat::expiry),
    ]
}

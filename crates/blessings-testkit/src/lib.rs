//! # Blessings Testkit
//!
//! Testing utilities for blessings.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Generators**: Proptest strategies for names, patterns, keys and caveats
//! - **Fixtures**: Helper structs for setting up multi-principal scenarios
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use blessings_testkit::generators::blessing_name;
//! use blessings_core::BlessingPattern;
//!
//! proptest! {
//!     #[test]
//!     fn name_matches_itself(name in blessing_name(4)) {
//!         prop_assert!(BlessingPattern::new(name.clone()).unwrap().matches(&name));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust
//! use blessings_testkit::fixtures::{call, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let alice = fixture.trusted_self_blessing("alice", vec![]);
//! assert_eq!(fixture.names_for(&alice, &call("Get")), vec!["alice"]);
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{call, call_at, multi_principal_fixtures, now_millis, TestFixture, HOUR_MS};

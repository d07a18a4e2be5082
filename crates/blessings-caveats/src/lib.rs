//! # Blessings Caveats
//!
//! Call context and pluggable caveat validation.
//!
//! A caveat names a validator by [`CaveatId`](blessings_core::CaveatId) and
//! carries CBOR parameters. The [`CaveatRegistry`] resolves the id, decodes
//! the parameters into the validator's `Params` type and runs it against a
//! [`Call`].
//!
//! ## Example
//!
//! ```
//! use blessings_caveats::{CallParams, CaveatRegistry};
//! use blessings_core::Caveat;
//!
//! let registry = CaveatRegistry::with_builtins();
//! let call = CallParams::new().method("Get").timestamp(1_000);
//!
//! assert!(registry.validate(&call, &Caveat::method(["Get"])).is_ok());
//! assert!(registry.validate(&call, &Caveat::expiry(999)).is_err());
//! ```

pub mod call;
pub mod registry;
pub mod validators;

pub use call::{Call, CallParams};
pub use registry::{CaveatRegistry, CaveatValidator, FnValidator};
pub use validators::{ExpiryValidator, MethodValidator, UnconstrainedValidator};

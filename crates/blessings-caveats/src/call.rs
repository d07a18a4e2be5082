//! The per-call context caveats are evaluated against.
//!
//! The transport layer owns the call; this crate only reads it.

use blessings_core::{Blessings, PublicKey};

/// Read-only view of an in-flight call.
pub trait Call {
    /// Name of the method being invoked.
    fn method(&self) -> &str;

    /// Object name suffix the call is addressed to.
    fn suffix(&self) -> &str;

    /// When the call is being made (Unix milliseconds).
    fn timestamp(&self) -> i64;

    /// Key of the principal receiving the call.
    fn local_key(&self) -> Option<&PublicKey> {
        None
    }

    /// Key of the principal on the other end.
    fn remote_key(&self) -> Option<&PublicKey> {
        None
    }

    /// Blessings the local end presented.
    fn local_blessings(&self) -> Option<&Blessings> {
        None
    }

    /// Blessings the remote end presented.
    fn remote_blessings(&self) -> Option<&Blessings> {
        None
    }
}

/// A plain call context, built field by field.
#[derive(Debug, Clone, Default)]
pub struct CallParams {
    method: String,
    suffix: String,
    timestamp: i64,
    local_key: Option<PublicKey>,
    remote_key: Option<PublicKey>,
    local_blessings: Option<Blessings>,
    remote_blessings: Option<Blessings>,
}

impl CallParams {
    /// Create an empty context (timestamp 0, no method).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the method.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Set the suffix.
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Set the timestamp (Unix milliseconds).
    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the local principal's key.
    pub fn local_key(mut self, key: PublicKey) -> Self {
        self.local_key = Some(key);
        self
    }

    /// Set the remote principal's key.
    pub fn remote_key(mut self, key: PublicKey) -> Self {
        self.remote_key = Some(key);
        self
    }

    /// Set the local blessings.
    pub fn local_blessings(mut self, blessings: Blessings) -> Self {
        self.local_blessings = Some(blessings);
        self
    }

    /// Set the remote blessings.
    pub fn remote_blessings(mut self, blessings: Blessings) -> Self {
        self.remote_blessings = Some(blessings);
        self
    }
}

impl Call for CallParams {
    fn method(&self) -> &str {
        &self.method
    }

    fn suffix(&self) -> &str {
        &self.suffix
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn local_key(&self) -> Option<&PublicKey> {
        self.local_key.as_ref()
    }

    fn remote_key(&self) -> Option<&PublicKey> {
        self.remote_key.as_ref()
    }

    fn local_blessings(&self) -> Option<&Blessings> {
        self.local_blessings.as_ref()
    }

    fn remote_blessings(&self) -> Option<&Blessings> {
        self.remote_blessings.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blessings_core::Keypair;

    #[test]
    fn test_call_params_accessors() {
        let key = Keypair::from_seed(&[5; 32]).public_key();
        let call = CallParams::new()
            .method("Get")
            .suffix("a/b")
            .timestamp(42)
            .remote_key(key);

        let call: &dyn Call = &call;
        assert_eq!(call.method(), "Get");
        assert_eq!(call.suffix(), "a/b");
        assert_eq!(call.timestamp(), 42);
        assert_eq!(call.remote_key(), Some(&key));
        assert_eq!(call.local_key(), None);
        assert!(call.remote_blessings().is_none());
    }
}

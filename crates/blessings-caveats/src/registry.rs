//! The caveat registry: maps caveat ids to validators.
//!
//! Registration happens during startup and takes the write lock. After that
//! the map is only read, so `validate` never waits on a writer. Validators run
//! after the lock is released and may call back into the registry.

use serde::de::DeserializeOwned;
use std::any::TypeId;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use blessings_core::{
    Caveat, CaveatId, Error, Result, EXPIRY_CAVEAT, METHOD_CAVEAT, UNCONSTRAINED_CAVEAT,
};

use crate::call::Call;
use crate::validators::{ExpiryValidator, MethodValidator, UnconstrainedValidator};

/// A condition that a caveat's parameters must satisfy for a call.
///
/// Validators are pure functions of `(call, params)`.
pub trait CaveatValidator: Send + Sync + 'static {
    /// The shape `Caveat::params` is decoded into.
    type Params: DeserializeOwned;

    /// Check the call. The error string becomes the failure reason.
    fn validate(&self, call: &dyn Call, params: Self::Params) -> std::result::Result<(), String>;
}

/// Adapter turning a closure into a [`CaveatValidator`].
pub struct FnValidator<P, F> {
    f: F,
    _params: PhantomData<fn() -> P>,
}

impl<P, F> FnValidator<P, F>
where
    P: DeserializeOwned + 'static,
    F: Fn(&dyn Call, P) -> std::result::Result<(), String> + Send + Sync + 'static,
{
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _params: PhantomData,
        }
    }
}

impl<P, F> CaveatValidator for FnValidator<P, F>
where
    P: DeserializeOwned + 'static,
    F: Fn(&dyn Call, P) -> std::result::Result<(), String> + Send + Sync + 'static,
{
    type Params = P;

    fn validate(&self, call: &dyn Call, params: P) -> std::result::Result<(), String> {
        (self.f)(call, params)
    }
}

/// Object-safe form of a validator: decodes raw params itself.
trait ErasedValidator: Send + Sync {
    fn validate_raw(&self, call: &dyn Call, params: &[u8]) -> std::result::Result<(), String>;
}

struct Typed<V>(V);

impl<V: CaveatValidator> ErasedValidator for Typed<V> {
    fn validate_raw(&self, call: &dyn Call, params: &[u8]) -> std::result::Result<(), String> {
        let params: V::Params = ciborium::from_reader(params)
            .map_err(|e| format!("cannot decode parameters: {}", e))?;
        self.0.validate(call, params)
    }
}

struct Entry {
    validator_type: TypeId,
    stateless: bool,
    validator: Arc<dyn ErasedValidator>,
}

impl Entry {
    fn new<V: CaveatValidator>(validator: V) -> Self {
        Self {
            validator_type: TypeId::of::<V>(),
            stateless: std::mem::size_of::<V>() == 0,
            validator: Arc::new(Typed(validator)),
        }
    }
}

/// Append-only map from caveat id to validator.
#[derive(Default)]
pub struct CaveatRegistry {
    validators: RwLock<HashMap<CaveatId, Entry>>,
}

impl CaveatRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the unconstrained, method and expiry validators.
    pub fn with_builtins() -> Self {
        let mut validators = HashMap::new();
        validators.insert(UNCONSTRAINED_CAVEAT, Entry::new(UnconstrainedValidator));
        validators.insert(METHOD_CAVEAT, Entry::new(MethodValidator));
        validators.insert(EXPIRY_CAVEAT, Entry::new(ExpiryValidator));
        Self {
            validators: RwLock::new(validators),
        }
    }

    /// The process-wide registry, created with the built-ins on first use.
    pub fn shared() -> Arc<CaveatRegistry> {
        static SHARED: OnceLock<Arc<CaveatRegistry>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(CaveatRegistry::with_builtins()))
            .clone()
    }

    /// Register `validator` for `id`.
    ///
    /// Registering the same stateless (zero-sized) validator type twice under
    /// one id is a no-op. Any other collision, including a second instance of
    /// a validator type that carries state, is an error and leaves the
    /// registry unchanged.
    pub fn register<V: CaveatValidator>(&self, id: CaveatId, validator: V) -> Result<()> {
        let mut validators = self
            .validators
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = validators.get(&id) {
            if existing.stateless && existing.validator_type == TypeId::of::<V>() {
                return Ok(());
            }
            return Err(Error::DuplicateCaveatRegistration(id));
        }

        validators.insert(id, Entry::new(validator));
        tracing::info!(caveat = %id, validator = std::any::type_name::<V>(), "registered caveat validator");
        Ok(())
    }

    /// Register a closure for `id`.
    pub fn register_fn<P, F>(&self, id: CaveatId, f: F) -> Result<()>
    where
        P: DeserializeOwned + 'static,
        F: Fn(&dyn Call, P) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.register(id, FnValidator::new(f))
    }

    /// Check one caveat against `call`.
    pub fn validate(&self, call: &dyn Call, caveat: &Caveat) -> Result<()> {
        let validator = self
            .validators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&caveat.id)
            .map(|entry| Arc::clone(&entry.validator))
            .ok_or(Error::UnrecognizedCaveat(caveat.id))?;

        validator
            .validate_raw(call, &caveat.params)
            .map_err(|reason| Error::CaveatValidationFailed {
                id: caveat.id,
                reason,
            })
    }

    /// Check caveats in order, stopping at the first failure.
    pub fn validate_all<'a>(
        &self,
        call: &dyn Call,
        caveats: impl IntoIterator<Item = &'a Caveat>,
    ) -> Result<()> {
        caveats
            .into_iter()
            .try_for_each(|caveat| self.validate(call, caveat))
    }

    /// Whether a validator is registered for `id`.
    pub fn is_registered(&self, id: &CaveatId) -> bool {
        self.validators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// Number of registered validators.
    pub fn len(&self) -> usize {
        self.validators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True iff nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for CaveatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaveatRegistry")
            .field("validators", &self.len())
            .finish()
    }
}

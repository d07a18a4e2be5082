//! Validators for the built-in caveat kinds.

use crate::call::Call;
use crate::registry::CaveatValidator;

/// Always satisfied. Params: `true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconstrainedValidator;

impl CaveatValidator for UnconstrainedValidator {
    type Params = bool;

    fn validate(&self, _call: &dyn Call, params: bool) -> Result<(), String> {
        if params {
            Ok(())
        } else {
            Err("unconstrained caveat with false parameter".into())
        }
    }
}

/// Satisfied iff the call's method is in the allow-set. Params: list of methods.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodValidator;

impl CaveatValidator for MethodValidator {
    type Params = Vec<String>;

    fn validate(&self, call: &dyn Call, methods: Vec<String>) -> Result<(), String> {
        if methods.iter().any(|m| m == call.method()) {
            Ok(())
        } else {
            Err(format!(
                "method {:?} not in [{}]",
                call.method(),
                methods.join(",")
            ))
        }
    }
}

/// Satisfied iff the call timestamp is at or before the deadline. Params: Unix ms.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpiryValidator;

impl CaveatValidator for ExpiryValidator {
    type Params = i64;

    fn validate(&self, call: &dyn Call, deadline: i64) -> Result<(), String> {
        if call.timestamp() <= deadline {
            Ok(())
        } else {
            Err(format!("expired at {}, call at {}", deadline, call.timestamp()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::CallParams;

    #[test]
    fn test_unconstrained() {
        let call = CallParams::new();
        assert!(UnconstrainedValidator.validate(&call, true).is_ok());
        assert!(UnconstrainedValidator.validate(&call, false).is_err());
    }

    #[test]
    fn test_method() {
        let call = CallParams::new().method("Get");
        assert!(MethodValidator
            .validate(&call, vec!["Put".into(), "Get".into()])
            .is_ok());
        assert!(MethodValidator.validate(&call, vec!["get".into()]).is_err());
        assert!(MethodValidator.validate(&call, vec![]).is_err());
    }

    #[test]
    fn test_expiry_boundary() {
        let hour = 3_600_000;
        let now = 1_736_870_400_000;
        let deadline = now + hour;

        assert!(ExpiryValidator
            .validate(&CallParams::new().timestamp(now), deadline)
            .is_ok());
        assert!(ExpiryValidator
            .validate(&CallParams::new().timestamp(deadline), deadline)
            .is_ok());
        assert!(ExpiryValidator
            .validate(&CallParams::new().timestamp(now + 2 * hour), deadline)
            .is_err());
    }
}

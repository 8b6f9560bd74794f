//! dispatch::validate
//!
//! Argument sufficiency checks.
//!
//! Only presence is checked. Argument values are not type-checked here;
//! operations validate their own inputs.

use serde_json::Value;

use super::params::ParameterSet;
use super::resolve::Invocable;
use super::task::{TaskContext, TaskError};
use super::DispatchError;
use crate::core::types::{Arguments, SECRETS_KEY};

/// An [`Invocable`] whose required parameters were confirmed present.
#[derive(Debug)]
pub struct ReadyCall {
    invocable: Invocable,
}

impl ReadyCall {
    /// The validated method.
    pub fn invocable(&self) -> &Invocable {
        &self.invocable
    }

    /// Call the method with the mapping it was validated against.
    pub fn invoke(&self, args: &Arguments, ctx: &TaskContext) -> Result<Value, TaskError> {
        self.invocable.call(args, ctx)
    }
}

/// Check that `args` supplies every parameter `invocable` requires.
///
/// `secrets` is always considered supplied.
///
/// # Errors
///
/// Returns `DispatchError::MissingArguments` listing every missing name.
pub fn validate(invocable: Invocable, args: &Arguments) -> Result<ReadyCall, DispatchError> {
    tracing::info!("Validating supplied args...");
    check_supplied(&invocable.required(), args, || invocable.target_name())?;
    tracing::info!("Arguments validated!");
    Ok(ReadyCall { invocable })
}

/// Shared check used for both methods and constructors.
pub(crate) fn check_supplied(
    required: &ParameterSet,
    args: &Arguments,
    target: impl FnOnce() -> String,
) -> Result<(), DispatchError> {
    let mut supplied = args.keys();
    supplied.insert(SECRETS_KEY);

    let missing = required.missing(&supplied);
    if missing.is_empty() {
        return Ok(());
    }

    Err(DispatchError::MissingArguments {
        target: target(),
        missing: missing.into_iter().map(String::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: serde_json::Value) -> Arguments {
        Arguments::try_from(value).unwrap()
    }

    #[test]
    fn all_present_passes() {
        let required = ParameterSet::new(&["a", "b"]);
        assert!(check_supplied(&required, &args(json!({"a": 1, "b": 2})), String::new).is_ok());
    }

    #[test]
    fn reports_only_missing_names() {
        let required = ParameterSet::new(&["a", "b"]);
        let err = check_supplied(&required, &args(json!({"a": 1})), || "T.m".into()).unwrap_err();
        assert_eq!(
            err,
            DispatchError::MissingArguments {
                target: "T.m".into(),
                missing: vec!["b".into()],
            }
        );
    }

    #[test]
    fn reports_every_missing_name_at_once() {
        let required = ParameterSet::new(&["x", "y", "z"]);
        let err = check_supplied(&required, &Arguments::new(), || "T.m".into()).unwrap_err();
        match err {
            DispatchError::MissingArguments { missing, .. } => {
                assert_eq!(missing, vec!["x", "y", "z"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn secrets_always_supplied() {
        let required = ParameterSet::new(&["secrets"]);
        assert!(check_supplied(&required, &Arguments::new(), String::new).is_ok());
    }

    #[test]
    fn extra_arguments_allowed() {
        let required = ParameterSet::new(&["a"]);
        let supplied = args(json!({"a": 1, "unused": true}));
        assert!(check_supplied(&required, &supplied, String::new).is_ok());
    }

    #[test]
    fn values_are_not_type_checked() {
        let required = ParameterSet::new(&["limit"]);
        let supplied = args(json!({"limit": "not a number"}));
        assert!(check_supplied(&required, &supplied, String::new).is_ok());
    }
}

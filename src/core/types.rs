//! core::types
//!
//! Strong types for the invocation request and its arguments.
//!
//! # Types
//!
//! - [`InvocationRequest`] - The three strings the orchestrator hands us
//! - [`Arguments`] - Named inputs passed to an invoked operation
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use taskshim::core::types::Arguments;
//!
//! let args = Arguments::try_from(json!({"sql": "SELECT 1", "limit": 10})).unwrap();
//! assert!(args.contains("sql"));
//! assert_eq!(args.get("limit"), Some(&json!(10)));
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::secrets::Secrets;

/// Reserved argument name under which secrets are injected.
pub const SECRETS_KEY: &str = "secrets";

/// A single task invocation, as supplied on the command line.
///
/// Built once per process and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    /// Code unit name, underscore-delimited (e.g. `billing_task`)
    pub module: String,
    /// Method to invoke on the resolved entry point
    pub cmd_to_run: String,
    /// Encoded argument bundle
    pub cmd_args: String,
}

impl InvocationRequest {
    /// Create a new invocation request.
    pub fn new(
        module: impl Into<String>,
        cmd_to_run: impl Into<String>,
        cmd_args: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            cmd_to_run: cmd_to_run.into(),
            cmd_args: cmd_args.into(),
        }
    }
}

/// The named inputs passed to an operation.
///
/// Keys are unique. Insertion order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    /// Create an empty argument mapping.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Look up an argument by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a string argument by name.
    ///
    /// Returns `None` if the key is absent or the value is not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Check whether an argument is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert or replace an argument, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Mutable access to a single argument.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// The set of supplied argument names.
    pub fn keys(&self) -> BTreeSet<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no arguments are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inject the process secrets under the reserved `secrets` key.
    ///
    /// A caller-supplied `secrets` argument is replaced.
    pub fn inject_secrets(&mut self, secrets: &Secrets) {
        let previous = self
            .0
            .insert(SECRETS_KEY.to_string(), Value::Object(secrets.to_map()));
        if previous.is_some() {
            tracing::warn!("caller supplied a '{}' argument; it was replaced", SECRETS_KEY);
        }
    }

    /// A copy of the mapping without the reserved `secrets` key.
    pub fn without_secrets(&self) -> Arguments {
        let mut map = self.0.clone();
        map.remove(SECRETS_KEY);
        Arguments(map)
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Arguments {
    type Error = Value;

    /// Accepts only JSON objects; any other value is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

//! secrets
//!
//! Process-scoped secrets, loaded from environment variables.
//!
//! # Architecture
//!
//! - [`literal`] parses the Python-style literal blobs upstream tooling writes
//! - [`SecretProvider`] reads `SECRETS`, `USERS`, and `AWS_CONFIG` once and
//!   merges them into an immutable [`Secrets`] mapping
//!
//! The CLI creates one provider at startup and threads the resulting
//! [`Secrets`] into the engine explicitly. There is no global secrets state.
//!
//! # Security
//!
//! - Secret values are **never** logged or included in error messages
//! - `Debug` output of [`Secrets`] shows key names only
//!
//! # Example
//!
//! ```no_run
//! use taskshim::secrets::SecretProvider;
//!
//! let provider = SecretProvider::from_process_env();
//! let secrets = provider.load()?;
//! if let Some(password) = secrets.get("db_password") {
//!     // Use password (never print it!)
//! }
//! # Ok::<(), taskshim::secrets::SecretError>(())
//! ```

pub mod literal;
mod provider;

pub use provider::{
    EnvSource, ProcessEnv, SecretProvider, AWS_CONFIG_VAR, SECRETS_VAR, SECRET_VARS, USERS_VAR,
};

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from secret loading.
///
/// Note: Error messages intentionally do not include secret values.
#[derive(Debug, Error)]
pub enum SecretError {
    /// An environment variable holds something other than a literal mapping.
    #[error("failed to parse secrets from ${var}: {reason}")]
    Parse {
        /// Variable name
        var: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Immutable mapping of secret names to values.
#[derive(Clone, Default, PartialEq)]
pub struct Secrets(Map<String, Value>);

impl Secrets {
    /// Wrap an already-merged mapping.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Get a secret by name.
    ///
    /// The returned value is the raw secret. Do not log or print it.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a string secret by name.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Names of all loaded secrets.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of secrets.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no secrets were loaded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy of the mapping, for injection into an argument set.
    pub fn to_map(&self) -> Map<String, Value> {
        self.0.clone()
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

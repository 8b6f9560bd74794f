//! secrets::provider
//!
//! Loads secrets from process environment state.
//!
//! # Sources
//!
//! Three variables are read, each optional, and merged in this order (later
//! keys win on collision):
//!
//! 1. `SECRETS` - passwords and API keys
//! 2. `USERS` - service account names
//! 3. `AWS_CONFIG` - AWS-style configuration
//!
//! Each variable holds a literal mapping (see [`super::literal`]).
//!
//! # Caching
//!
//! A provider reads the environment at most once. The first successful
//! [`SecretProvider::load`] is cached for the provider's lifetime, and the
//! process creates exactly one provider at startup.

use std::sync::OnceLock;

use serde_json::{Map, Value};

use super::literal::parse_permissive;
use super::{SecretError, Secrets};

/// Variable holding the generic secrets blob.
pub const SECRETS_VAR: &str = "SECRETS";

/// Variable holding the users blob.
pub const USERS_VAR: &str = "USERS";

/// Variable holding the AWS-style config blob.
pub const AWS_CONFIG_VAR: &str = "AWS_CONFIG";

/// Merge order of the secret variables.
pub const SECRET_VARS: [&str; 3] = [SECRETS_VAR, USERS_VAR, AWS_CONFIG_VAR];

/// Read access to environment variables.
pub trait EnvSource {
    /// Get a variable's value, or `None` if unset.
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Environment-backed secret loader with a per-provider cache.
#[derive(Debug)]
pub struct SecretProvider<E: EnvSource = ProcessEnv> {
    env: E,
    cache: OnceLock<Secrets>,
}

impl SecretProvider<ProcessEnv> {
    /// Create a provider over the process environment.
    pub fn from_process_env() -> Self {
        Self::new(ProcessEnv)
    }
}

impl<E: EnvSource> SecretProvider<E> {
    /// Create a provider over a custom environment source.
    pub fn new(env: E) -> Self {
        Self {
            env,
            cache: OnceLock::new(),
        }
    }

    /// Load the merged secrets mapping.
    ///
    /// The environment is read on the first successful call only; later
    /// calls return the cached mapping.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::Parse` if a variable is set but does not hold
    /// a mapping. Failures are not cached.
    pub fn load(&self) -> Result<&Secrets, SecretError> {
        if let Some(secrets) = self.cache.get() {
            return Ok(secrets);
        }
        let secrets = self.read_environment()?;
        Ok(self.cache.get_or_init(|| secrets))
    }

    fn read_environment(&self) -> Result<Secrets, SecretError> {
        tracing::info!("Loading secrets from environment vars");
        let mut merged = Map::new();

        for var in SECRET_VARS {
            match self.env.var(var) {
                Some(raw) => {
                    let slot = parse_slot(var, &raw)?;
                    tracing::debug!(var, keys = slot.len(), "loaded secret slot");
                    merged.extend(slot);
                }
                None if var == SECRETS_VAR => {
                    tracing::info!("Secrets do not exist in environment");
                }
                None => {
                    tracing::debug!(var, "secret slot not set");
                }
            }
        }

        Ok(Secrets::from_map(merged))
    }
}

/// Parse one variable's blob into a mapping.
fn parse_slot(var: &'static str, raw: &str) -> Result<Map<String, Value>, SecretError> {
    if raw.trim().is_empty() {
        return Err(SecretError::Parse {
            var,
            reason: "value is empty".into(),
        });
    }

    match parse_permissive(raw) {
        Value::Object(map) => Ok(map),
        Value::String(_) => Err(SecretError::Parse {
            var,
            reason: "value is not a literal mapping".into(),
        }),
        _ => Err(SecretError::Parse {
            var,
            reason: "value parsed, but is not a mapping".into(),
        }),
    }
}

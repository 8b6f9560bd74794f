//! core::config::schema
//!
//! Configuration file schema.
//!
//! # Validation
//!
//! Unknown keys are rejected at parse time. Values are validated after
//! parsing (e.g. the output path must not be empty).

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::publish::OutputFormat;

/// Top-level configuration file.
///
/// # Example
///
/// ```toml
/// [output]
/// delay_ms = 3000
/// path = "/tmp/xcom"
/// format = "json"
///
/// [log]
/// filter = "info"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Output publishing settings
    pub output: Option<OutputSection>,

    /// Logging settings
    pub log: Option<LogSection>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = self.output.as_ref().and_then(|o| o.path.as_deref()) {
            if path.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "output.path cannot be empty".into(),
                ));
            }
        }

        if let Some(filter) = self.log.as_ref().and_then(|l| l.filter.as_deref()) {
            if filter.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "log.filter cannot be empty".into(),
                ));
            }
        }

        Ok(())
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    /// Pause after printing a result, in milliseconds
    pub delay_ms: Option<u64>,

    /// Base path for file artifacts (extension is appended)
    pub path: Option<String>,

    /// File artifact format
    pub format: Option<OutputFormat>,
}

/// `[log]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogSection {
    /// tracing filter directive (e.g. "info", "taskshim=debug")
    pub filter: Option<String>,
}

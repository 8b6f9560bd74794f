//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! taskshim runs as a one-shot process, so configuration is small: how and
//! where results are published, and the default log filter.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file named by `$TASKSHIM_CONFIG`
//! 3. `RUST_LOG` for the log filter, CLI flags (not handled here)
//!
//! # Example
//!
//! ```no_run
//! use taskshim::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("Output base path: {}", config.output_path().display());
//! println!("Delay: {:?}", config.output_delay());
//! ```

pub mod schema;

pub use schema::{ConfigFile, LogSection, OutputSection};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::publish::OutputFormat;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "TASKSHIM_CONFIG";

/// Default pause after printing a result.
pub const DEFAULT_DELAY_MS: u64 = 3000;

/// Default base path for file artifacts.
pub const DEFAULT_OUTPUT_PATH: &str = "/tmp/xcom";

/// Default log filter.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Resolved configuration.
///
/// Accessors apply defaults for anything the file leaves unset.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed config file contents (defaults if no file)
    pub file: ConfigFile,
    /// Path the config was loaded from, if any
    source: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `$TASKSHIM_CONFIG`, if set.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable names a file that cannot be read or
    /// parsed. An unset variable is not an error (defaults are used).
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load_from(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        Ok(Self {
            file,
            source: Some(path.to_path_buf()),
        })
    }

    /// Path the configuration was loaded from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Pause after printing a result to stdout.
    ///
    /// Defaults to 3 seconds.
    pub fn output_delay(&self) -> Duration {
        let ms = self
            .file
            .output
            .as_ref()
            .and_then(|o| o.delay_ms)
            .unwrap_or(DEFAULT_DELAY_MS);
        Duration::from_millis(ms)
    }

    /// Base path for file artifacts, without extension.
    ///
    /// Defaults to `/tmp/xcom`.
    pub fn output_path(&self) -> PathBuf {
        self.file
            .output
            .as_ref()
            .and_then(|o| o.path.as_deref())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH))
    }

    /// Format for file artifacts.
    ///
    /// Defaults to `json`.
    pub fn output_format(&self) -> OutputFormat {
        self.file
            .output
            .as_ref()
            .and_then(|o| o.format)
            .unwrap_or_default()
    }

    /// Log filter from the config file.
    ///
    /// Defaults to `info`. `RUST_LOG` takes precedence at logging setup.
    pub fn log_filter(&self) -> &str {
        self.file
            .log
            .as_ref()
            .and_then(|l| l.filter.as_deref())
            .unwrap_or(DEFAULT_LOG_FILTER)
    }
}

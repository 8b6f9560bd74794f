//! publish
//!
//! Publishing an operation's return value for downstream tasks.
//!
//! # Channels
//!
//! - [`TextChannel`] prints the value as one line on stdout, where the
//!   orchestrator's log scraper picks it up, then pauses so the scraper sees
//!   it before the process exits
//! - [`FileChannel`] writes the value to `{base_path}.{format}`
//!
//! Operations reach both channels through the [`Publisher`] in their
//! [`crate::dispatch::TaskContext`]. The shim itself never publishes.
//!
//! # Formats
//!
//! | Format | Content |
//! |--------|---------|
//! | `txt`  | [`format_text`] output: strings verbatim, everything else as compact JSON |
//! | `json` | Pretty-printed JSON document |

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::core::config::Config;

/// Errors from publishing a result.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to write result to stdout: {0}")]
    Stdout(#[source] io::Error),

    #[error("failed to write result file '{path}': {source}")]
    File { path: PathBuf, source: io::Error },

    #[error("failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// On-disk encoding of a file artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Canonical text form
    Txt,
    /// JSON document
    #[default]
    Json,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Json => "json",
        }
    }

    /// Encode a value in this format.
    pub fn encode(&self, value: &Value) -> Result<String, PublishError> {
        match self {
            OutputFormat::Txt => format_text(value),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Canonical single-line text form of a value.
///
/// Strings are returned verbatim; mappings, sequences, and other scalars
/// are serialized as compact JSON.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use taskshim::publish::format_text;
///
/// assert_eq!(format_text(&json!("done")).unwrap(), "done");
/// assert_eq!(format_text(&json!({"rows": 3})).unwrap(), r#"{"rows":3}"#);
/// ```
pub fn format_text(value: &Value) -> Result<String, PublishError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Ok(serde_json::to_string(other)?),
    }
}

/// Publishes a value as a line on stdout.
#[derive(Debug, Clone)]
pub struct TextChannel {
    /// Pause after writing
    pub delay: Duration,
}

impl TextChannel {
    /// Create a text channel with the given post-write pause.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Print a value to stdout, then pause.
    pub fn publish(&self, value: &Value) -> Result<(), PublishError> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.publish_to(&mut lock, value)
    }

    /// Write a value to `out`, then pause.
    ///
    /// `out` is flushed before and after the line so nothing buffered
    /// earlier interleaves with the value.
    pub fn publish_to<W: Write>(&self, out: &mut W, value: &Value) -> Result<(), PublishError> {
        let line = format_text(value)?;
        out.flush().map_err(PublishError::Stdout)?;
        writeln!(out, "{}", line).map_err(PublishError::Stdout)?;
        out.flush().map_err(PublishError::Stdout)?;

        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        Ok(())
    }
}

/// Publishes a value to a file artifact.
#[derive(Debug, Clone)]
pub struct FileChannel {
    /// Path without extension
    pub base_path: PathBuf,
    /// Encoding and extension
    pub format: OutputFormat,
}

impl FileChannel {
    /// Create a file channel.
    pub fn new(base_path: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            base_path: base_path.into(),
            format,
        }
    }

    /// Full path of the artifact: `{base_path}.{format}`.
    pub fn output_path(&self) -> PathBuf {
        let mut path = self.base_path.clone().into_os_string();
        path.push(".");
        path.push(self.format.extension());
        PathBuf::from(path)
    }

    /// Write a value to the artifact, replacing any previous content.
    ///
    /// Returns the path written.
    pub fn publish(&self, value: &Value) -> Result<PathBuf, PublishError> {
        let path = self.output_path();
        tracing::info!("Writing result to {}", path.display());
        let contents = self.format.encode(value)?;
        write_atomic(&path, contents.as_bytes())?;
        Ok(path)
    }
}

/// Write a file atomically (temp file + rename).
fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), PublishError> {
    let file_err = |source: io::Error| PublishError::File {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(file_err)?;
    }

    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);

    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(file_err)?;
        file.write_all(contents).map_err(file_err)?;
        file.sync_all().map_err(file_err)?;
    }

    fs::rename(&temp_path, path).map_err(file_err)
}

/// Both publishing channels, configured for this process.
#[derive(Debug, Clone)]
pub struct Publisher {
    /// stdout channel
    pub text: TextChannel,
    /// file artifact channel
    pub file: FileChannel,
}

impl Publisher {
    /// Build channels from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            text: TextChannel::new(config.output_delay()),
            file: FileChannel::new(config.output_path(), config.output_format()),
        }
    }

    /// Print a value to stdout.
    pub fn print(&self, value: &Value) -> Result<(), PublishError> {
        self.text.publish(value)
    }

    /// Write a value to the file artifact.
    pub fn write(&self, value: &Value) -> Result<PathBuf, PublishError> {
        self.file.publish(value)
    }
}

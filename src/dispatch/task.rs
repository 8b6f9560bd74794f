//! dispatch::task
//!
//! The interface every code unit implements.
//!
//! # Entry Point Kinds
//!
//! A code unit's entry type is one of two kinds, chosen explicitly:
//!
//! - [`StaticTask`] - never constructed. Its methods are plain functions of
//!   the argument mapping.
//! - [`ConstructedTask`] - constructed from the full argument mapping, after
//!   its constructor's [`ParameterSet`] is satisfied. Its methods take `&self`.
//!
//! # Example
//!
//! ```
//! use serde_json::{json, Value};
//! use taskshim::core::types::Arguments;
//! use taskshim::dispatch::{
//!     ParameterSet, StaticMethod, StaticTask, TaskContext, TaskError, TaskUnit,
//! };
//!
//! struct Health;
//!
//! impl TaskUnit for Health {
//!     const MODULE: &'static str = "health";
//!     const ENTRY_TYPE: &'static str = "Health";
//! }
//!
//! impl StaticTask for Health {
//!     const METHODS: &'static [StaticMethod] = &[StaticMethod {
//!         name: "check",
//!         required: ParameterSet::EMPTY,
//!         call: check,
//!     }];
//! }
//!
//! fn check(_args: &Arguments, _ctx: &TaskContext) -> Result<Value, TaskError> {
//!     Ok(json!("ok"))
//! }
//! ```

use std::io;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use super::params::ParameterSet;
use crate::core::config::Config;
use crate::core::types::Arguments;
use crate::publish::{PublishError, Publisher};

/// Errors raised by task logic itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    /// An argument is present but unusable.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    /// Publishing the result failed. `message` carries the OS error text;
    /// `path` and `kind` keep the detail callers match on.
    #[error("failed to publish result: {message}")]
    Publish {
        message: String,
        path: Option<PathBuf>,
        kind: Option<io::ErrorKind>,
    },

    /// Any other task failure.
    #[error("{0}")]
    Failed(String),
}

impl TaskError {
    /// Shorthand for [`TaskError::InvalidArgument`].
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        TaskError::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`TaskError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        TaskError::Failed(message.into())
    }
}

impl From<PublishError> for TaskError {
    fn from(err: PublishError) -> Self {
        let (path, kind) = match &err {
            PublishError::Stdout(source) => (None, Some(source.kind())),
            PublishError::File { path, source } => (Some(path.clone()), Some(source.kind())),
            PublishError::Serialize(_) => (None, None),
        };
        TaskError::Publish {
            message: err.to_string(),
            path,
            kind,
        }
    }
}

/// What an operation receives besides its arguments.
#[derive(Debug, Clone)]
pub struct TaskContext {
    publisher: Publisher,
}

impl TaskContext {
    /// Create a context around a publisher.
    pub fn new(publisher: Publisher) -> Self {
        Self { publisher }
    }

    /// Build a context from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Publisher::from_config(config))
    }

    /// Output channels for the operation's return value.
    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }
}

/// Signature of a static operation.
pub type StaticFn = fn(&Arguments, &TaskContext) -> Result<Value, TaskError>;

/// A method on a static entry type.
#[derive(Clone, Copy)]
pub struct StaticMethod {
    /// Method name, as passed with `--cmd-to-run`
    pub name: &'static str,
    /// Arguments the method cannot run without
    pub required: ParameterSet,
    /// Implementation
    pub call: StaticFn,
}

/// A method on a constructed entry type.
pub struct Method<T: 'static> {
    /// Method name, as passed with `--cmd-to-run`
    pub name: &'static str,
    /// Arguments the method cannot run without
    pub required: ParameterSet,
    /// Implementation
    pub call: fn(&T, &Arguments, &TaskContext) -> Result<Value, TaskError>,
}

/// Identity of a code unit.
pub trait TaskUnit {
    /// Name the orchestrator uses (`--module`)
    const MODULE: &'static str;

    /// Name of the unit's entry type; must follow
    /// [`crate::core::naming::entry_type_name`]
    const ENTRY_TYPE: &'static str;

    /// One-time setup, run the first time the unit is resolved.
    fn load() -> Result<(), TaskError> {
        Ok(())
    }
}

/// An entry type used without construction.
pub trait StaticTask: TaskUnit {
    /// Methods callable on the type.
    const METHODS: &'static [StaticMethod];
}

/// An entry type constructed from the argument mapping.
pub trait ConstructedTask: TaskUnit + Sized + 'static {
    /// Arguments the constructor cannot run without.
    const REQUIRED: ParameterSet;

    /// Methods callable on an instance.
    const METHODS: &'static [Method<Self>];

    /// Build an instance from the full argument mapping (secrets included).
    fn construct(args: &Arguments) -> Result<Self, TaskError>;
}

/// Fetch a required string argument.
pub fn arg_str<'a>(args: &'a Arguments, name: &str) -> Result<&'a str, TaskError> {
    match args.get(name) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(TaskError::invalid(name, "expected a string")),
        None => Err(TaskError::invalid(name, "missing")),
    }
}

/// Fetch a required numeric argument.
pub fn arg_f64(args: &Arguments, name: &str) -> Result<f64, TaskError> {
    match args.get(name) {
        Some(value) => value
            .as_f64()
            .ok_or_else(|| TaskError::invalid(name, "expected a number")),
        None => Err(TaskError::invalid(name, "missing")),
    }
}

/// Fetch a required non-negative integer argument.
pub fn arg_u64(args: &Arguments, name: &str) -> Result<u64, TaskError> {
    match args.get(name) {
        Some(value) => value
            .as_u64()
            .ok_or_else(|| TaskError::invalid(name, "expected a non-negative integer")),
        None => Err(TaskError::invalid(name, "missing")),
    }
}

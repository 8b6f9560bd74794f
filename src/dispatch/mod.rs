//! dispatch
//!
//! Resolving a code unit and method by name, and validating arguments.
//!
//! # Modules
//!
//! - [`params`] - Declared required-parameter sets
//! - [`task`] - The traits code units implement
//! - [`registry`] - Explicit module name → code unit registry
//! - [`resolve`] - Turns (module, method) into an [`Invocable`]
//! - [`validate`] - Checks the argument mapping covers an invocable's
//!   requirements and hands back a [`ReadyCall`]
//!
//! # Invariants
//!
//! - Only a [`ReadyCall`] can be invoked, and only [`validate`] makes one
//! - A constructed entry type is only constructed after its constructor's
//!   required parameters are confirmed present
//! - `secrets` is always treated as supplied, whether or not the mapping
//!   physically holds it
//!
//! # Example
//!
//! ```ignore
//! use taskshim::dispatch::{resolve, validate};
//!
//! let invocable = resolve(&registry, "billing_task", "invoice", &args)?;
//! let ready = validate(invocable, &args)?;
//! let result = ready.invoke(&args, &ctx)?;
//! ```

pub mod params;
pub mod registry;
pub mod resolve;
pub mod task;
pub mod validate;

pub use params::ParameterSet;
pub use registry::{CodeUnit, Registry, RegistryError};
pub use resolve::{resolve, Invocable};
pub use task::{
    arg_f64, arg_str, arg_u64, ConstructedTask, Method, StaticFn, StaticMethod, StaticTask,
    TaskContext, TaskError, TaskUnit,
};
pub use validate::{validate, ReadyCall};

use thiserror::Error;

/// Errors from resolving or validating a call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The module is not in the registry.
    #[error(
        "module '{module}' does not exist in the source root. \
         Please review the available modules: {}",
        .available.join(", ")
    )]
    ModuleNotFound {
        module: String,
        available: Vec<String>,
    },

    /// The module exists but its load hook failed. The failure is
    /// reported as-is.
    #[error("{error}")]
    Load { module: String, error: TaskError },

    /// The entry type has no such method.
    #[error(
        "{method} not implemented for module {module}. \
         Please review the available methods: {}",
        .available.join(", ")
    )]
    MethodNotImplemented {
        method: String,
        module: String,
        available: Vec<String>,
    },

    /// Required parameters are absent from the argument mapping.
    #[error(
        "invalid arguments for {target}\n\
         The following required args are missing from the method call: {}\n\
         Please review the syntax",
        .missing.join(", ")
    )]
    MissingArguments { target: String, missing: Vec<String> },

    /// The entry type's constructor rejected the arguments.
    #[error("failed to construct {entry_type}: {error}")]
    Construction {
        entry_type: String,
        error: TaskError,
    },
}

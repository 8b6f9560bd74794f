//! dispatch::registry
//!
//! The explicit registry of code units.
//!
//! # Design
//!
//! The registry maps the name the orchestrator passes with `--module` to a
//! [`CodeUnit`]. It is populated once at startup (see
//! [`crate::units::builtin_registry`]) and read-only afterwards.
//!
//! Registration enforces:
//! - module names are non-empty and unique
//! - the entry type name follows [`entry_type_name`] for the module name
//! - method names are unique within a unit
//!
//! # Loading
//!
//! Each unit has a one-time load hook ([`crate::dispatch::TaskUnit::load`]). It runs the first
//! time the unit is resolved and its outcome is cached, so repeated
//! resolutions within one process never run it twice.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;

use serde_json::Value;
use thiserror::Error;

use super::params::ParameterSet;
use super::task::{ConstructedTask, StaticMethod, StaticTask, TaskContext, TaskError};
use crate::core::naming::entry_type_name;
use crate::core::types::Arguments;

/// An instance method bound to its constructed instance.
pub(crate) type BoundCall = Box<dyn Fn(&Arguments, &TaskContext) -> Result<Value, TaskError>>;

type LookupFn = fn(&str) -> Option<(&'static str, ParameterSet)>;
type BindFn = fn(&Arguments, &str) -> Result<Option<BoundCall>, TaskError>;
type LoadFn = fn() -> Result<(), TaskError>;

/// Errors from building the registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("code unit module name cannot be empty")]
    EmptyModule,

    #[error("code unit '{0}' is already registered")]
    DuplicateModule(String),

    #[error("code unit '{module}' must expose entry type '{expected}', found '{found}'")]
    EntryTypeMismatch {
        module: String,
        expected: String,
        found: String,
    },

    #[error("code unit '{module}' declares method '{method}' more than once")]
    DuplicateMethod { module: String, method: String },
}

/// How a unit's entry type is turned into a call target.
pub(crate) enum EntryPoint {
    /// Methods are called on the type itself.
    Static { methods: &'static [StaticMethod] },
    /// An instance is constructed first.
    Constructed {
        required: ParameterSet,
        lookup: LookupFn,
        bind: BindFn,
    },
}

/// A registered code unit.
pub struct CodeUnit {
    module: &'static str,
    entry_type: &'static str,
    method_names: Vec<&'static str>,
    pub(crate) entry: EntryPoint,
    loader: LoadFn,
    loaded: OnceLock<Result<(), TaskError>>,
}

impl CodeUnit {
    /// A unit whose entry type is used without construction.
    pub fn from_static<T: StaticTask>() -> Self {
        Self {
            module: T::MODULE,
            entry_type: T::ENTRY_TYPE,
            method_names: T::METHODS.iter().map(|m| m.name).collect(),
            entry: EntryPoint::Static {
                methods: T::METHODS,
            },
            loader: T::load,
            loaded: OnceLock::new(),
        }
    }

    /// A unit whose entry type is constructed from the arguments.
    pub fn from_constructed<T: ConstructedTask>() -> Self {
        Self {
            module: T::MODULE,
            entry_type: T::ENTRY_TYPE,
            method_names: T::METHODS.iter().map(|m| m.name).collect(),
            entry: EntryPoint::Constructed {
                required: T::REQUIRED,
                lookup: lookup_method::<T>,
                bind: bind_method::<T>,
            },
            loader: T::load,
            loaded: OnceLock::new(),
        }
    }

    /// Module name.
    pub fn module(&self) -> &'static str {
        self.module
    }

    /// Entry type name.
    pub fn entry_type(&self) -> &'static str {
        self.entry_type
    }

    /// True if the entry type is constructed before method lookup.
    pub fn is_constructed(&self) -> bool {
        matches!(self.entry, EntryPoint::Constructed { .. })
    }

    /// Names of all callable methods.
    pub fn method_names(&self) -> &[&'static str] {
        &self.method_names
    }

    /// Run the load hook if it has not run yet; return its cached outcome.
    pub(crate) fn ensure_loaded(&self) -> Result<(), TaskError> {
        self.loaded
            .get_or_init(|| {
                tracing::debug!(module = self.module, "running code unit load hook");
                (self.loader)()
            })
            .clone()
    }
}

impl fmt::Debug for CodeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeUnit")
            .field("module", &self.module)
            .field("entry_type", &self.entry_type)
            .field("constructed", &self.is_constructed())
            .field("methods", &self.method_names)
            .finish()
    }
}

fn lookup_method<T: ConstructedTask>(name: &str) -> Option<(&'static str, ParameterSet)> {
    T::METHODS
        .iter()
        .find(|m| m.name == name)
        .map(|m| (m.name, m.required))
}

/// Construct `T` and bind `name` to the instance. `None` if no such method.
fn bind_method<T: ConstructedTask>(
    args: &Arguments,
    name: &str,
) -> Result<Option<BoundCall>, TaskError> {
    let Some(call) = T::METHODS.iter().find(|m| m.name == name).map(|m| m.call) else {
        return Ok(None);
    };
    let instance = T::construct(args)?;
    Ok(Some(Box::new(
        move |args: &Arguments, ctx: &TaskContext| call(&instance, args, ctx),
    )))
}

/// Explicit mapping from module name to code unit.
#[derive(Debug, Default)]
pub struct Registry {
    units: BTreeMap<&'static str, CodeUnit>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a code unit.
    ///
    /// # Errors
    ///
    /// See [`RegistryError`].
    pub fn register(&mut self, unit: CodeUnit) -> Result<(), RegistryError> {
        if unit.module.is_empty() {
            return Err(RegistryError::EmptyModule);
        }
        if self.units.contains_key(unit.module) {
            return Err(RegistryError::DuplicateModule(unit.module.to_string()));
        }

        let expected = entry_type_name(unit.module);
        if unit.entry_type != expected {
            return Err(RegistryError::EntryTypeMismatch {
                module: unit.module.to_string(),
                expected,
                found: unit.entry_type.to_string(),
            });
        }

        let mut seen = BTreeSet::new();
        for name in &unit.method_names {
            if !seen.insert(*name) {
                return Err(RegistryError::DuplicateMethod {
                    module: unit.module.to_string(),
                    method: name.to_string(),
                });
            }
        }

        self.units.insert(unit.module, unit);
        Ok(())
    }

    /// Look up a unit by module name.
    pub fn get(&self, module: &str) -> Option<&CodeUnit> {
        self.units.get(module)
    }

    /// Registered module names, sorted.
    pub fn modules(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.units.keys().copied()
    }

    /// Number of registered units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// True when no units are registered.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

//! units
//!
//! The source root: every code unit the shim can invoke.
//!
//! # Design
//!
//! Code units are registered explicitly in [`builtin_registry`]. Adding a
//! unit means writing a type that implements [`StaticTask`] or
//! [`ConstructedTask`] and adding one line here. Registration checks that
//! the entry type is named after the module (`billing_task` ->
//! `BillingTask`).
//!
//! | Module         | Entry type    | Kind        | Methods           |
//! |----------------|---------------|-------------|-------------------|
//! | `echo`         | `Echo`        | static      | `echo`, `ping`    |
//! | `sql_task`     | `SqlTask`     | constructed | `render`, `preview` |
//! | `billing_task` | `BillingTask` | constructed | `invoice`         |
//!
//! [`StaticTask`]: crate::dispatch::StaticTask
//! [`ConstructedTask`]: crate::dispatch::ConstructedTask

pub mod billing_task;
pub mod echo;
pub mod sql_task;

pub use billing_task::BillingTask;
pub use echo::Echo;
pub use sql_task::SqlTask;

use crate::dispatch::{CodeUnit, Registry, RegistryError};

/// Build the registry of built-in code units.
pub fn builtin_registry() -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();
    registry.register(CodeUnit::from_static::<Echo>())?;
    registry.register(CodeUnit::from_constructed::<SqlTask>())?;
    registry.register(CodeUnit::from_constructed::<BillingTask>())?;
    Ok(registry)
}

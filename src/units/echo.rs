//! units::echo
//!
//! Diagnostic unit. Used by the orchestrator to smoke-test a deployment.

use serde_json::{json, Value};

use crate::core::types::Arguments;
use crate::dispatch::{ParameterSet, StaticMethod, StaticTask, TaskContext, TaskError, TaskUnit};

/// Entry type of the `echo` module.
pub struct Echo;

impl TaskUnit for Echo {
    const MODULE: &'static str = "echo";
    const ENTRY_TYPE: &'static str = "Echo";
}

impl StaticTask for Echo {
    const METHODS: &'static [StaticMethod] = &[
        StaticMethod {
            name: "echo",
            required: ParameterSet::EMPTY,
            call: echo,
        },
        StaticMethod {
            name: "ping",
            required: ParameterSet::EMPTY,
            call: ping,
        },
    ];
}

/// Print the caller's arguments (never the secrets) and return them.
fn echo(args: &Arguments, ctx: &TaskContext) -> Result<Value, TaskError> {
    let value = args.without_secrets().into_value();
    ctx.publisher().print(&value)?;
    Ok(value)
}

fn ping(_args: &Arguments, _ctx: &TaskContext) -> Result<Value, TaskError> {
    Ok(json!("pong"))
}

//! engine
//!
//! The invocation pipeline: Decode -> Normalize -> Inject -> Resolve -> Validate -> Invoke.
//!
//! # Lifecycle
//!
//! ```text
//! cmd_args ──decode──> Arguments ──normalize──> ──inject secrets──>
//!     resolve(module, method) ──> validate ──> invoke ──> Value
//! ```
//!
//! Each stage fails with its own error type; [`RunError`] wraps them so the
//! process boundary can log one line and exit non-zero.
//!
//! # Invariants
//!
//! - The mapping passed to validation and invocation holds exactly the
//!   caller's keys plus `secrets`
//! - Secret values are never logged; only argument names are
//! - The engine never publishes output. Invoked operations do that through
//!   the [`TaskContext`]
//!
//! # Example
//!
//! ```ignore
//! use taskshim::engine::run;
//!
//! let request = InvocationRequest::new("echo", "ping", encoded);
//! let value = run(&request, &registry, secrets, &ctx)?;
//! ```

use serde_json::Value;
use thiserror::Error;

use crate::codec::{self, CodecError};
use crate::core::types::{Arguments, InvocationRequest};
use crate::dispatch::{resolve, validate, DispatchError, Registry, TaskContext, TaskError};
use crate::secrets::Secrets;

/// Errors from running an invocation.
#[derive(Debug, Error)]
pub enum RunError {
    /// The argument bundle could not be decoded.
    #[error("failed to decode arguments: {0}")]
    Decode(#[from] CodecError),

    /// Resolution or validation failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The invoked operation failed.
    #[error("task failed: {0}")]
    Task(#[from] TaskError),
}

/// Run one invocation end to end and return the operation's value.
///
/// `secrets` is loaded once by the caller and injected here; this function
/// never reads the environment.
pub fn run(
    request: &InvocationRequest,
    registry: &Registry,
    secrets: &Secrets,
    ctx: &TaskContext,
) -> Result<Value, RunError> {
    let mut args = prepare(&request.cmd_args)?;

    tracing::info!(
        "Running module '{}' and method '{}' with params {:?}",
        request.module,
        request.cmd_to_run,
        args.keys()
    );

    args.inject_secrets(secrets);

    let invocable = resolve(registry, &request.module, &request.cmd_to_run, &args)?;
    let ready = validate(invocable, &args)?;

    tracing::debug!("Invoking {}", ready.invocable().target_name());
    Ok(ready.invoke(&args, ctx)?)
}

/// Decode and normalize an encoded argument bundle.
fn prepare(encoded: &str) -> Result<Arguments, CodecError> {
    let args = codec::decode(encoded)?;
    Ok(codec::normalize(args))
}

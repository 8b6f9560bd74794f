//! taskshim - A generic task-invocation shim for workflow orchestrators
//!
//! An orchestrator launches `taskshim` once per task with a module name, a
//! method name, and an encoded argument bundle. The shim loads secrets from
//! the environment, decodes the arguments, resolves the requested code unit
//! and method, checks that every required parameter is supplied, and runs it.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, owns the process boundary)
//! - [`engine`] - Runs the Decode → Resolve → Validate → Invoke pipeline
//! - [`core`] - Request types, naming convention, configuration
//! - [`codec`] - Argument bundle decoding and SQL quote normalization
//! - [`secrets`] - Environment secret loading and literal parsing
//! - [`dispatch`] - Code unit registry, resolution, and argument validation
//! - [`publish`] - Publishing return values to stdout or a file artifact
//! - [`units`] - The built-in code units available to the orchestrator
//!
//! # Correctness Invariants
//!
//! 1. The argument mapping handed to an operation holds exactly the caller's
//!    keys plus the injected `secrets` key
//! 2. No operation is invoked before its required parameters are confirmed present
//! 3. Secrets are read from the environment at most once per process
//! 4. Every failure is logged before it reaches the process boundary

pub mod cli;
pub mod codec;
pub mod core;
pub mod dispatch;
pub mod engine;
pub mod publish;
pub mod secrets;
pub mod units;

//! core
//!
//! Core domain types and configuration for taskshim.
//!
//! # Modules
//!
//! - [`types`] - Invocation request and argument mapping
//! - [`naming`] - Module name to entry type naming convention
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - The invocation request is immutable once built from CLI input
//! - The argument mapping is mutated only by normalization and secrets injection

pub mod config;
pub mod naming;
pub mod types;

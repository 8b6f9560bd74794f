//! cli
//!
//! Command-line interface layer for taskshim.
//!
//! # Responsibilities
//!
//! - Parse the invocation flags
//! - Install logging, load configuration and secrets once
//! - Hand the request to [`crate::engine::run`]
//! - Log any failure with its full cause chain before exiting non-zero
//!
//! # Architecture
//!
//! The CLI layer is thin. It owns the process boundary and nothing else;
//! every decision about what to call and with what lives in the engine.

pub mod args;
pub mod logging;

pub use args::Cli;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::dispatch::TaskContext;
use crate::engine;
use crate::secrets::SecretProvider;
use crate::units::builtin_registry;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    // Logging comes up before config so config errors are logged too.
    let config = Config::load();
    let filter = config
        .as_ref()
        .map(|c| c.log_filter().to_string())
        .unwrap_or_else(|_| crate::core::config::DEFAULT_LOG_FILTER.to_string());
    logging::init(&filter, cli.debug);

    let result = execute(&cli, config.context("failed to load configuration"));
    if let Err(err) = &result {
        tracing::error!("{:#}", err);
    }
    result
}

fn execute(cli: &Cli, config: Result<Config>) -> Result<()> {
    let config = config?;
    if let Some(path) = config.source() {
        tracing::debug!("Loaded configuration from {}", path.display());
    }

    let provider = SecretProvider::from_process_env();
    let secrets = provider.load()?;

    let registry = builtin_registry().context("failed to build code unit registry")?;
    let ctx = TaskContext::from_config(&config);

    engine::run(&cli.request(), &registry, secrets, &ctx)?;
    tracing::info!("Method '{}' completed", cli.cmd_to_run);
    Ok(())
}

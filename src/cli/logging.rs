//! cli::logging
//!
//! Process-wide `tracing` subscriber.
//!
//! Events go to stderr, one line each, with their target. Stdout carries
//! only the values operations publish, so the last stdout line is always
//! the result the orchestrator hands to downstream tasks.
//! `RUST_LOG` wins over the configured filter; `--debug` wins over both.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Install the global subscriber.
///
/// A second call is a no-op.
pub fn init(config_filter: &str, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_filter))
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false);

    let _ = Registry::default().with(filter).with(fmt_layer).try_init();
}

//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Flags
//!
//! - `--module <name>`: Code unit to load (e.g. `billing_task`)
//! - `--cmd-to-run <method>`: Method to invoke on the unit's entry type
//! - `--cmd-args <bundle>`: Encoded argument bundle (base64 CBOR mapping)
//! - `--debug`: Enable debug logging

use clap::Parser;

use crate::core::types::InvocationRequest;

/// taskshim - run one method of one code unit for a workflow orchestrator
#[derive(Parser, Debug)]
#[command(name = "taskshim")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Code unit to load
    #[arg(long)]
    pub module: String,

    /// Method to invoke
    #[arg(long = "cmd-to-run")]
    pub cmd_to_run: String,

    /// Encoded argument bundle
    #[arg(long = "cmd-args", allow_hyphen_values = true)]
    pub cmd_args: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// The invocation these flags describe.
    pub fn request(&self) -> InvocationRequest {
        InvocationRequest::new(&self.module, &self.cmd_to_run, &self.cmd_args)
    }
}

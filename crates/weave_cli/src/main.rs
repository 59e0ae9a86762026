//! stackweave CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or declaration file
//! - 3: Validation failure
//! - 4: Graph error (missing, ambiguous or cyclic capabilities)
//! - 5: Wiring error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use weave_core::SynthError;
use weave_graph::GraphError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const GRAPH_ERROR: u8 = 4;
    pub const WIRING_ERROR: u8 = 5;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_directives = if cli.verbose {
        "weave=debug,info"
    } else if cli.quiet {
        "warn"
    } else {
        "weave=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let result = match cli.command {
        Commands::Synth(args) => commands::synth::execute(args),
        Commands::Order(args) => commands::order::execute(args),
        Commands::Routes(args) => commands::routes::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<SynthError>() {
        Some(SynthError::Model(_)) => ExitCodes::VALIDATION_FAILURE,
        Some(SynthError::Graph(GraphError::InvalidStack { .. })) => ExitCodes::VALIDATION_FAILURE,
        Some(SynthError::Graph(_)) => ExitCodes::GRAPH_ERROR,
        Some(SynthError::Wiring(_)) | Some(SynthError::UnknownReference { .. }) => {
            ExitCodes::WIRING_ERROR
        }
        Some(
            SynthError::Declaration(_)
            | SynthError::UnsupportedFormat(_)
            | SynthError::Io(_)
            | SynthError::Yaml(_)
            | SynthError::Toml(_),
        ) => ExitCodes::INVALID_ARGS,
        Some(SynthError::Emit(_) | SynthError::Json(_)) | None => ExitCodes::GENERAL_ERROR,
    }
}

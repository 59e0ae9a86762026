//! CLI command definitions.
//!
//! Each subcommand loads a declaration file and runs the synthesis pipeline
//! up to the stage it reports on.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use weave_core::PlanDeclaration;

pub mod order;
pub mod routes;
pub mod synth;
pub mod validate;

/// stackweave - multi-stack infrastructure topology synthesizer
#[derive(Parser)]
#[command(name = "weave")]
#[command(version, about = "stackweave - multi-stack infrastructure topology synthesizer")]
#[command(long_about = r#"
stackweave turns independently declared stacks into a deterministic,
dependency-ordered provisioning plan, wiring typed cross-stack capabilities
and public API routes down to container ports.

COMMANDS:
  synth     → Run the full pipeline and print the plan as JSON
  order     → Print the stack synthesis order and provisioning waves
  routes    → Print the route table
  validate  → Check a declaration without emitting a plan

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or declaration file
  3 - Validation failure
  4 - Graph error
  5 - Wiring error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Synthesize a plan from a declaration file
    Synth(synth::SynthArgs),

    /// Print the synthesis order and waves
    Order(order::OrderArgs),

    /// Print the route table
    Routes(routes::RoutesArgs),

    /// Validate a declaration file
    Validate(validate::ValidateArgs),
}

/// Declaration file argument shared by every command.
#[derive(Args, Debug, Clone)]
pub struct DeclarationArgs {
    /// Declaration file (.yaml, .yml or .toml)
    #[arg(short, long, env = "WEAVE_FILE")]
    pub file: PathBuf,
}

impl DeclarationArgs {
    pub fn load(&self) -> Result<PlanDeclaration> {
        load_declaration(&self.file)
    }
}

pub fn load_declaration(path: &Path) -> Result<PlanDeclaration> {
    PlanDeclaration::from_file(path)
        .with_context(|| format!("Failed to load declaration {}", path.display()))
}

//! Synth command - Run the full pipeline and emit the plan.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use weave_core::{JsonFileEmitter, JsonWriterEmitter, Synthesizer};

use super::DeclarationArgs;

#[derive(Args)]
pub struct SynthArgs {
    #[command(flatten)]
    pub declaration: DeclarationArgs,

    /// Write the plan to this file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn execute(args: SynthArgs) -> Result<()> {
    info!("Synthesizing {}", args.declaration.file.display());

    let declaration = args.declaration.load()?;
    let synthesizer = Synthesizer::new();

    match &args.out {
        Some(path) => {
            let mut emitter = JsonFileEmitter::new(path);
            let plan = synthesizer
                .synthesize_and_emit(&declaration, &mut emitter)
                .context("Synthesis failed")?;
            println!(
                "✅ Plan with {} stacks and {} routes written to {}",
                plan.stacks.len(),
                plan.routes.len(),
                path.display()
            );
        }
        None => {
            let mut emitter = JsonWriterEmitter::new(std::io::stdout().lock());
            synthesizer
                .synthesize_and_emit(&declaration, &mut emitter)
                .context("Synthesis failed")?;
        }
    }

    Ok(())
}

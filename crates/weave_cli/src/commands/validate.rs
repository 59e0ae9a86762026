//! Validate command - Check a declaration without emitting a plan.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use weave_core::Synthesizer;

use super::DeclarationArgs;

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub declaration: DeclarationArgs,
}

pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("Validating {}", args.declaration.file.display());

    let declaration = args.declaration.load()?;
    let plan = Synthesizer::new()
        .synthesize(&declaration)
        .context("Validation failed")?;

    let resources: usize = plan.stacks.iter().map(|s| s.resources.len()).sum();
    println!("✅ Declaration is valid");
    println!("   {} stacks in {} waves", plan.stacks.len(), plan.waves.len());
    println!("   {} resources", resources);
    println!("   {} routes into {} target groups", plan.routes.len(), plan.target_groups.len());

    for registration in plan.target_groups.iter().filter(|r| r.targets.is_empty()) {
        println!("   ⚠️  Target group {} has no registered targets", registration.target_group);
    }

    Ok(())
}

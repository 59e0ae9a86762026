//! Routes command - Print the route table.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use weave_core::Synthesizer;

use super::DeclarationArgs;

#[derive(Args)]
pub struct RoutesArgs {
    #[command(flatten)]
    pub declaration: DeclarationArgs,
}

pub fn execute(args: RoutesArgs) -> Result<()> {
    info!("Wiring routes for {}", args.declaration.file.display());

    let declaration = args.declaration.load()?;
    let plan = Synthesizer::new()
        .synthesize(&declaration)
        .context("Failed to wire routes")?;

    if plan.routes.is_empty() {
        println!("⚠️  No routes declared");
        return Ok(());
    }

    print!("{}", plan.route_table);
    Ok(())
}

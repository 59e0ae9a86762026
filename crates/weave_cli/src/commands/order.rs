//! Order command - Print the synthesis order and provisioning waves.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use weave_core::Synthesizer;

use super::DeclarationArgs;

#[derive(Args)]
pub struct OrderArgs {
    #[command(flatten)]
    pub declaration: DeclarationArgs,

    /// Print the order as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: OrderArgs) -> Result<()> {
    info!("Resolving synthesis order for {}", args.declaration.file.display());

    let declaration = args.declaration.load()?;
    let (graph, order) = Synthesizer::new()
        .resolve_order(&declaration)
        .context("Failed to resolve synthesis order")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&order)?);
        return Ok(());
    }

    println!("📋 Synthesis order ({} stacks, {} edges):", order.len(), graph.edges().len());
    for (i, stack) in order.stacks().iter().enumerate() {
        let producers = graph
            .stack(stack)
            .map(|s| s.producers().join(", "))
            .unwrap_or_default();
        if producers.is_empty() {
            println!("   {}. {}", i + 1, stack);
        } else {
            println!("   {}. {} (after {})", i + 1, stack, producers);
        }
    }

    println!();
    println!("🌊 Provisioning waves:");
    for (i, wave) in order.waves().iter().enumerate() {
        println!("   wave {}: {}", i, wave.join(", "));
    }

    Ok(())
}

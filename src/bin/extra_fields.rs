//! extra-fields CLI tool
//!
//! Reads a run configuration, loads every configured client schema and writes the mapping table,
//! documentation table, graph artifact and schema catalogs.

use clap::Parser;
use extra_fields::{
    config::MappingConfig,
    pipeline::{read_client_schemas, run},
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "extra-fields")]
#[command(author, version, about = "Build the canonical field mapping between two schema vocabularies", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "extra-fields.toml")]
    config: PathBuf,

    /// Write every artifact into this directory instead of the configured locations
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = MappingConfig::from_path(&cli.config)?;
    if let Some(dir) = cli.out_dir.as_ref() {
        config.redirect_output(dir);
    }
    if config.clients.is_empty() {
        return Err(format!("no clients configured in {}", cli.config.display()).into());
    }

    let schemas = read_client_schemas(&config)?;
    let (artifacts, catalog) = run(&config, &schemas)?;
    artifacts.write_to(&config.output)?;
    catalog.write_to(&config.output)?;

    if cli.verbose {
        println!("\n=== Mapping Results ===");
        println!("Labels: {}", artifacts.mapping.len());
        println!("Conflicts: {}", artifacts.resolved.conflicts.len());
        println!(
            "Edges removed from routing: {}",
            artifacts.resolved.removed_edges()
        );
        println!("Hop-through edges: {}", artifacts.expanded.added.len());
        for hop in artifacts.expanded.added.iter() {
            println!("  [{}] {} -> {} via {}", hop.event, hop.label, hop.target, hop.via);
        }
    }

    Ok(())
}

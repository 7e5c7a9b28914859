use anyhow::{bail, Result};
use clap::Parser;
use reggraph::graph::GraphStore;
use reggraph::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "export")]
#[command(about = "Export the knowledge graph in node-link format for visualization")]
struct Args {
    /// Output path (defaults to the configured export path)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args = Args::parse();
    let config = Config::load_or_default()?;
    let snapshot_path = config.snapshot_path();

    let Some(store) = GraphStore::load(&snapshot_path)? else {
        bail!(
            "No graph snapshot at {}. Run `ingest` first.",
            snapshot_path.display()
        );
    };

    let output = args.output.unwrap_or_else(|| config.export_path());
    store.export_to_file(&output)?;

    println!(
        "Exported {} nodes and {} edges to {}",
        store.node_count(),
        store.edge_count(),
        output.display()
    );

    Ok(())
}

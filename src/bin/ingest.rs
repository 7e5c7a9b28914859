use anyhow::Result;
use clap::Parser;
use reggraph::builder::GraphBuilder;
use reggraph::graph::GraphStore;
use reggraph::ingest::discover_documents;
use reggraph::Config;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Build the enforcement knowledge graph from processed document files")]
struct Args {
    /// Directory containing .json/.jsonl document chunk files
    docs_dir: PathBuf,

    /// Discard any existing snapshot and rebuild from scratch
    #[arg(short, long)]
    rebuild: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args = Args::parse();

    log::info!("Starting knowledge graph ingestion");

    let config = Config::load_or_default()?;
    let snapshot_path = config.snapshot_path();
    log::info!("Graph name: {}", config.graph.name);
    log::info!("Snapshot path: {}", snapshot_path.display());

    let mut builder = if args.rebuild {
        log::info!("Mode: full rebuild");
        GraphBuilder::with_defaults(config.graph.name.clone())?
    } else {
        match GraphStore::load(&snapshot_path)? {
            Some(store) => {
                log::info!(
                    "Continuing from existing snapshot ({} nodes, {} edges)",
                    store.node_count(),
                    store.edge_count()
                );
                GraphBuilder::from_store(store)?
            }
            None => GraphBuilder::with_defaults(config.graph.name.clone())?,
        }
    };

    log::info!("Discovering documents in {}", args.docs_dir.display());
    let docs = discover_documents(&args.docs_dir)?;
    log::info!("Found {} document chunks", docs.len());

    if docs.is_empty() {
        log::warn!("No documents found to process. Check the docs directory path.");
        return Ok(());
    }

    let start = Instant::now();
    let result = builder.process_batch(&docs);
    let elapsed = start.elapsed();

    builder.store().save(&snapshot_path)?;

    let stats = builder.get_domain_statistics();

    println!("\n=== Knowledge Graph Ingestion Summary ===\n");
    println!("Documents processed: {}", result.documents_processed);
    println!("Entities extracted:  {}", result.total_entities);
    println!("Relationships:       {}", result.total_relationships);
    println!("Errors:              {}", result.errors);
    println!("Elapsed:             {:.2}s", elapsed.as_secs_f64());
    println!();
    println!("Graph totals: {} nodes, {} edges", stats.graph.total_nodes, stats.graph.total_edges);
    println!(
        "  entities={} violations={} documents={} regulators={} penalties={}",
        stats.entities, stats.violations, stats.documents, stats.regulators, stats.penalties
    );
    println!("\nSnapshot written to {}", snapshot_path.display());

    Ok(())
}

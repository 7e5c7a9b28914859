use anyhow::{bail, Result};
use reggraph::builder::GraphBuilder;
use reggraph::graph::GraphStore;
use reggraph::Config;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let config = Config::load_or_default()?;
    let snapshot_path = config.snapshot_path();

    let Some(store) = GraphStore::load(&snapshot_path)? else {
        bail!(
            "No graph snapshot at {}. Run `ingest` first.",
            snapshot_path.display()
        );
    };
    let builder = GraphBuilder::from_store(store)?;
    let stats = builder.get_domain_statistics();

    println!("\n=== Knowledge Graph Statistics ===\n");
    println!("Graph: {}", stats.graph.graph_name);
    println!("Created: {}", stats.graph.created_at);
    println!("Last updated: {}", stats.graph.last_updated);
    println!();
    println!("Total nodes: {}", stats.graph.total_nodes);
    println!("Total edges: {}", stats.graph.total_edges);
    println!();

    println!("Node types:");
    let mut node_types: Vec<_> = stats.graph.node_types.iter().collect();
    node_types.sort_by(|a, b| b.1.cmp(a.1));
    for (node_type, count) in node_types {
        println!("  {:<12} {:>8}", node_type, count);
    }
    println!();

    println!("Relationship types:");
    let mut rel_types: Vec<_> = stats.graph.relationship_types.iter().collect();
    rel_types.sort_by(|a, b| b.1.cmp(a.1));
    for (rel_type, count) in rel_types {
        println!("  {:<18} {:>8}", rel_type, count);
    }
    println!();

    if !stats.top_entities.is_empty() {
        println!("Most cited entities:");
        for entry in &stats.top_entities {
            println!("  {:<40} {:>5} citations", entry.name, entry.citations);
        }
        println!();
    }

    if !stats.top_violations.is_empty() {
        println!("Most cited violations:");
        for entry in &stats.top_violations {
            println!("  {:<40} {:>5} citations", entry.name, entry.citations);
        }
        println!();
    }

    Ok(())
}

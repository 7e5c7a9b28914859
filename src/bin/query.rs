use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use reggraph::builder::GraphBuilder;
use reggraph::graph::GraphStore;
use reggraph::Config;

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Query the enforcement knowledge graph")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List violations attached to an entity
    Violations {
        /// Entity name, e.g. "XYZ Industries Ltd"
        entity: String,
    },
    /// Rank entities that committed a violation
    Similar {
        /// Violation type, e.g. "insider trading"
        violation: String,
        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Bounded multi-hop traversal from a node id
    Hops {
        /// Start node id, e.g. "Entity_xyz_industries_ltd"
        start: String,
        /// Maximum hops to traverse
        #[arg(long)]
        max_hops: Option<usize>,
        /// Restrict traversal to these relationship types
        #[arg(long = "relationship")]
        relationships: Vec<String>,
    },
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
    let builder = GraphBuilder::from_store(store)?;

    match args.command {
        Command::Violations { entity } => {
            let violations = builder.find_entity_violations(&entity);
            if violations.is_empty() {
                println!("No violations found for \"{entity}\"");
            } else {
                println!("{}", serde_json::to_string_pretty(&violations)?);
            }
        }
        Command::Similar { violation, limit } => {
            let limit = limit.unwrap_or(config.query.similar_case_limit);
            let cases = builder.find_similar_cases(&violation, limit);
            if cases.is_empty() {
                println!("No cases found for \"{violation}\"");
            } else {
                println!("{}", serde_json::to_string_pretty(&cases)?);
            }
        }
        Command::Hops {
            start,
            max_hops,
            relationships,
        } => {
            let max_hops = max_hops.unwrap_or(config.query.max_hops);
            let filter = if relationships.is_empty() {
                None
            } else {
                Some(relationships.as_slice())
            };
            let result = builder.store().multi_hop_query(&start, max_hops, filter);
            println!(
                "{} paths, {} nodes reached",
                result.paths.len(),
                result.nodes.len()
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

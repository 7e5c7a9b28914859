pub mod builder;
pub mod config;
pub mod error;
pub mod extract;
pub mod graph;
pub mod ingest;

pub use builder::{normalize_id, BatchResult, DocumentResult, GraphBuilder};
pub use config::Config;
pub use error::{ReggraphError, Result};
pub use extract::{Extractor, LexiconNer, NamedEntityRecognizer};
pub use graph::{Edge, GraphStore, Node, NodeType, RelationType};
pub use ingest::DocumentChunk;

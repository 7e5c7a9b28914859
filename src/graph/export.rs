//! Node-link export for visualization tooling.
//!
//! This is a read-only derived view; the persistence format of record is the
//! snapshot in [`crate::graph::store`].

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::graph::store::GraphStatistics;
use crate::graph::GraphStore;

/// One node in the node-link view.
#[derive(Debug, Clone, Serialize)]
pub struct ExportNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub citations: u32,
    /// Visualization grouping key; same as the node type.
    pub group: String,
}

/// One edge in the node-link view.
#[derive(Debug, Clone, Serialize)]
pub struct ExportEdge {
    #[serde(rename = "from")]
    pub source: String,
    #[serde(rename = "to")]
    pub target: String,
    pub label: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportMetadata {
    pub graph_name: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub statistics: GraphStatistics,
}

/// Node-link representation of the whole graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphExport {
    pub nodes: Vec<ExportNode>,
    pub edges: Vec<ExportEdge>,
    pub metadata: ExportMetadata,
}

impl GraphStore {
    /// Build the node-link view, nodes and edges in insertion order.
    pub fn export(&self) -> GraphExport {
        let nodes = self
            .node_ids()
            .iter()
            .filter_map(|id| self.get_node(id))
            .map(|node| ExportNode {
                id: node.id.clone(),
                label: node.name.clone(),
                node_type: node.node_type.to_string(),
                citations: node.citation_count,
                group: node.node_type.to_string(),
            })
            .collect();

        let mut edges = Vec::with_capacity(self.edge_count());
        for id in self.node_ids() {
            for edge in self.outgoing_edges(id) {
                edges.push(ExportEdge {
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    label: edge.relationship.clone(),
                    confidence: edge.confidence,
                });
            }
        }

        GraphExport {
            nodes,
            edges,
            metadata: ExportMetadata {
                graph_name: self.name().to_string(),
                created_at: self.created_at(),
                last_updated: self.last_updated(),
                statistics: self.get_statistics(),
            },
        }
    }

    /// Write the node-link view as pretty-printed JSON.
    pub fn export_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.export())?;
        std::fs::write(path, json)?;
        log::info!("Graph exported for visualization: {}", path.display());
        Ok(())
    }
}

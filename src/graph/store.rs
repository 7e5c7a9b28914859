//! In-memory typed multigraph store with snapshot persistence.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ReggraphError, Result};
use crate::graph::{Edge, Node, NodeType};

/// Directed, labeled multigraph keyed by string node ids.
///
/// Adjacency is a plain `node -> outgoing edges` map plus a
/// `(node, relationship) -> targets` index for filtered neighbor lookups.
/// Node insertion order is tracked explicitly so scans, statistics and
/// tie-breaks are deterministic.
#[derive(Debug, Clone)]
pub struct GraphStore {
    name: String,
    nodes: HashMap<String, Node>,
    /// Node ids in insertion order; all linear scans iterate this.
    node_order: Vec<String>,
    outgoing: HashMap<String, Vec<Edge>>,
    /// source id -> relationship -> target ids (one entry per edge).
    rel_index: HashMap<String, HashMap<String, Vec<String>>>,
    edge_count: usize,
    created_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

/// Whole-graph persistence artifact: full node/edge set plus metadata.
#[derive(Debug, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub graph_name: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Aggregate graph statistics.
#[derive(Debug, Clone, Serialize)]
pub struct GraphStatistics {
    pub graph_name: String,
    pub total_nodes: usize,
    pub total_edges: usize,
    pub node_types: HashMap<String, usize>,
    pub relationship_types: HashMap<String, usize>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl GraphStore {
    /// Create an empty graph store.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            nodes: HashMap::new(),
            node_order: Vec::new(),
            outgoing: HashMap::new(),
            rel_index: HashMap::new(),
            edge_count: 0,
            created_at: now,
            last_updated: now,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Insert a node, overwriting any existing node with the same id.
    ///
    /// This is not an upsert: callers wanting merge semantics must
    /// read-then-write via [`GraphStore::get_node_mut`]. `created_at` is
    /// stamped here on every call. Existing edges are kept on overwrite.
    pub fn add_node(&mut self, mut node: Node) {
        node.created_at = Utc::now();
        if !self.nodes.contains_key(&node.id) {
            self.node_order.push(node.id.clone());
        }
        self.nodes.insert(node.id.clone(), node);
        self.last_updated = Utc::now();
    }

    /// Insert an edge. Always appends; duplicate edges between the same pair
    /// are kept (multigraph).
    ///
    /// Both endpoints must already exist. The builder resolves endpoints
    /// before inserting, so a [`ReggraphError::MissingEndpoint`] here means a
    /// construction bug, not bad input.
    pub fn add_edge(&mut self, mut edge: Edge) -> Result<()> {
        if !self.nodes.contains_key(&edge.source) {
            return Err(ReggraphError::MissingEndpoint(edge.source));
        }
        if !self.nodes.contains_key(&edge.target) {
            return Err(ReggraphError::MissingEndpoint(edge.target));
        }

        edge.created_at = Utc::now();
        self.rel_index
            .entry(edge.source.clone())
            .or_default()
            .entry(edge.relationship.clone())
            .or_default()
            .push(edge.target.clone());
        self.outgoing
            .entry(edge.source.clone())
            .or_default()
            .push(edge);
        self.edge_count += 1;
        self.last_updated = Utc::now();
        Ok(())
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutable node access for read-merge-write callers. Counts as a graph
    /// mutation, so `last_updated` is bumped.
    pub fn get_node_mut(&mut self, id: &str) -> Option<&mut Node> {
        if self.nodes.contains_key(id) {
            self.last_updated = Utc::now();
        }
        self.nodes.get_mut(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> &[String] {
        &self.node_order
    }

    /// Outgoing edges of a node, in insertion order.
    pub fn outgoing_edges(&self, id: &str) -> &[Edge] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All edges from `source` to `target` (a multigraph may hold several).
    pub fn edges_between(&self, source: &str, target: &str) -> Vec<&Edge> {
        self.outgoing_edges(source)
            .iter()
            .filter(|e| e.target == target)
            .collect()
    }

    /// Unique neighbor ids of a node in first-seen order.
    ///
    /// With a relationship filter, only targets reachable by at least one
    /// edge of that relationship are returned. An unknown node yields an
    /// empty list.
    pub fn get_neighbors(&self, id: &str, relationship: Option<&str>) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut neighbors = Vec::new();

        match relationship {
            Some(rel) => {
                let targets = self
                    .rel_index
                    .get(id)
                    .and_then(|by_rel| by_rel.get(rel))
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                for target in targets {
                    if seen.insert(target.clone()) {
                        neighbors.push(target.clone());
                    }
                }
            }
            None => {
                for edge in self.outgoing_edges(id) {
                    if seen.insert(edge.target.clone()) {
                        neighbors.push(edge.target.clone());
                    }
                }
            }
        }

        neighbors
    }

    /// All node ids of a given type, in insertion order.
    pub fn find_nodes_by_type(&self, node_type: NodeType) -> Vec<String> {
        self.node_order
            .iter()
            .filter(|id| {
                self.nodes
                    .get(*id)
                    .map(|n| n.node_type == node_type)
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// Linear scan for nodes whose named property equals `value`.
    pub fn find_nodes_by_property(&self, key: &str, value: &str) -> Vec<String> {
        self.node_order
            .iter()
            .filter(|id| {
                self.nodes
                    .get(*id)
                    .and_then(|n| n.property(key))
                    .map(|v| v == value)
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// Aggregate statistics. Per-type counts always sum to the totals.
    pub fn get_statistics(&self) -> GraphStatistics {
        let mut node_types: HashMap<String, usize> = HashMap::new();
        for id in &self.node_order {
            if let Some(node) = self.nodes.get(id) {
                *node_types.entry(node.node_type.to_string()).or_insert(0) += 1;
            }
        }

        let mut relationship_types: HashMap<String, usize> = HashMap::new();
        for edges in self.outgoing.values() {
            for edge in edges {
                *relationship_types
                    .entry(edge.relationship.clone())
                    .or_insert(0) += 1;
            }
        }

        GraphStatistics {
            graph_name: self.name.clone(),
            total_nodes: self.nodes.len(),
            total_edges: self.edge_count,
            node_types,
            relationship_types,
            created_at: self.created_at,
            last_updated: self.last_updated,
        }
    }

    /// Induced subgraph over the given node ids: those nodes plus every edge
    /// whose endpoints are both in the set. Insertion order is preserved.
    pub fn subgraph(&self, ids: &[String]) -> GraphStore {
        let keep: std::collections::HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut sub = GraphStore::new(self.name.clone());

        for id in &self.node_order {
            if keep.contains(id.as_str()) {
                if let Some(node) = self.nodes.get(id) {
                    sub.add_node(node.clone());
                }
            }
        }
        for id in &self.node_order {
            if !keep.contains(id.as_str()) {
                continue;
            }
            for edge in self.outgoing_edges(id) {
                if keep.contains(edge.target.as_str()) {
                    // Endpoints verified present above.
                    let _ = sub.add_edge(edge.clone());
                }
            }
        }

        sub
    }

    /// Remove all nodes and edges, keeping the graph name.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.node_order.clear();
        self.outgoing.clear();
        self.rel_index.clear();
        self.edge_count = 0;
        self.last_updated = Utc::now();
        log::info!("Graph cleared: {}", self.name);
    }

    /// Full node/edge snapshot, nodes in insertion order.
    pub fn snapshot(&self) -> GraphSnapshot {
        let nodes = self
            .node_order
            .iter()
            .filter_map(|id| self.nodes.get(id).cloned())
            .collect();
        let mut edges = Vec::with_capacity(self.edge_count);
        for id in &self.node_order {
            edges.extend(self.outgoing_edges(id).iter().cloned());
        }
        GraphSnapshot {
            graph_name: self.name.clone(),
            created_at: self.created_at,
            last_updated: self.last_updated,
            nodes,
            edges,
        }
    }

    /// Rebuild a store from a snapshot, restoring metadata and indexes.
    ///
    /// Inserts directly rather than via `add_node`/`add_edge` so the
    /// node/edge timestamps from the snapshot are kept as-is.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self> {
        let mut store = GraphStore::new(snapshot.graph_name);
        for node in snapshot.nodes {
            if !store.nodes.contains_key(&node.id) {
                store.node_order.push(node.id.clone());
            }
            store.nodes.insert(node.id.clone(), node);
        }
        for edge in snapshot.edges {
            if !store.nodes.contains_key(&edge.source) {
                return Err(ReggraphError::MissingEndpoint(edge.source));
            }
            if !store.nodes.contains_key(&edge.target) {
                return Err(ReggraphError::MissingEndpoint(edge.target));
            }
            store
                .rel_index
                .entry(edge.source.clone())
                .or_default()
                .entry(edge.relationship.clone())
                .or_default()
                .push(edge.target.clone());
            store
                .outgoing
                .entry(edge.source.clone())
                .or_default()
                .push(edge);
            store.edge_count += 1;
        }
        store.created_at = snapshot.created_at;
        store.last_updated = snapshot.last_updated;
        Ok(store)
    }

    /// Save the whole graph as a JSON snapshot.
    ///
    /// A failed save leaves the in-memory graph untouched.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, json)?;
        log::info!(
            "Graph saved to {} ({} nodes, {} edges)",
            path.display(),
            self.nodes.len(),
            self.edge_count
        );
        Ok(())
    }

    /// Load a graph snapshot from disk.
    ///
    /// Returns `Ok(None)` when the artifact does not exist; a corrupt
    /// artifact is a fatal deserialization error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            log::warn!("Graph snapshot not found: {}", path.display());
            return Ok(None);
        }
        let json = std::fs::read_to_string(path)?;
        let snapshot: GraphSnapshot = serde_json::from_str(&json)?;
        let store = Self::from_snapshot(snapshot)?;
        log::info!(
            "Graph loaded from {} ({} nodes, {} edges)",
            path.display(),
            store.nodes.len(),
            store.edge_count
        );
        Ok(Some(store))
    }
}

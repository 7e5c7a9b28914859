//! Bounded multi-hop graph traversal.

use std::collections::HashSet;

use serde::Serialize;

use crate::graph::GraphStore;

/// One hop of a traversal path (source --relationship--> target).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathStep {
    pub source: String,
    pub relationship: String,
    pub target: String,
}

/// An edge encountered during traversal, with its properties.
#[derive(Debug, Clone, Serialize)]
pub struct TraversedEdge {
    pub source: String,
    pub relationship: String,
    pub target: String,
    pub confidence: f32,
    pub source_document: Option<String>,
}

/// Result of a multi-hop traversal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TraversalResult {
    /// Every relationship chain discovered, one entry per edge traversed.
    pub paths: Vec<Vec<PathStep>>,
    /// Nodes expanded during traversal. Always contains the start node when
    /// it exists, even with no outgoing edges.
    pub nodes: HashSet<String>,
    pub relationships: Vec<TraversedEdge>,
}

impl GraphStore {
    /// Depth-bounded traversal from `start_node`, surfacing all relationship
    /// chains within `max_hops`.
    ///
    /// An explicit work-stack of `(node, path, hop)` entries replaces
    /// recursion, so the hop bound is the only depth limit. At each expanded
    /// node every outgoing edge (after optional relationship filtering)
    /// records a new path; the edge target is expanded only while
    /// `hop < max_hops`. A node may be revisited through a different path
    /// within the hop bound: this surfaces all chains, not just
    /// reachability, and the hop bound keeps cycles finite.
    ///
    /// An absent start node yields an empty result, not an error.
    pub fn multi_hop_query(
        &self,
        start_node: &str,
        max_hops: usize,
        relationship_filter: Option<&[String]>,
    ) -> TraversalResult {
        let mut result = TraversalResult::default();

        if !self.contains_node(start_node) {
            return result;
        }

        let mut stack: Vec<(String, Vec<PathStep>, usize)> =
            vec![(start_node.to_string(), Vec::new(), 0)];

        while let Some((current, path, hop)) = stack.pop() {
            result.nodes.insert(current.clone());

            for edge in self.outgoing_edges(&current) {
                if let Some(filter) = relationship_filter {
                    if !filter.iter().any(|r| *r == edge.relationship) {
                        continue;
                    }
                }

                let mut new_path = path.clone();
                new_path.push(PathStep {
                    source: current.clone(),
                    relationship: edge.relationship.clone(),
                    target: edge.target.clone(),
                });
                result.relationships.push(TraversedEdge {
                    source: current.clone(),
                    relationship: edge.relationship.clone(),
                    target: edge.target.clone(),
                    confidence: edge.confidence,
                    source_document: edge.source_document.clone(),
                });

                if hop < max_hops {
                    stack.push((edge.target.clone(), new_path.clone(), hop + 1));
                }
                result.paths.push(new_path);
            }
        }

        result
    }
}

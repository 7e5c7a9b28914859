//! Domain queries over the constructed graph: violation lookup,
//! similar-case ranking and aggregate statistics.

use serde::Serialize;

use crate::builder::{normalize_id, GraphBuilder};
use crate::graph::{GraphStatistics, NodeType};

/// One violation edge attached to an entity. Multiple edges to the same
/// violation yield multiple entries.
#[derive(Debug, Clone, Serialize)]
pub struct EntityViolation {
    pub violation: String,
    pub violation_id: String,
    pub relationship: String,
    pub confidence: f32,
    pub context: String,
}

/// One entity sharing a violation, ranked by citation count.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarCase {
    pub entity: String,
    pub entity_id: String,
    pub violation: String,
    pub citation_count: u32,
    pub documents: Vec<String>,
}

/// A heavily-cited node in the top-N listings.
#[derive(Debug, Clone, Serialize)]
pub struct TopNode {
    pub id: String,
    pub name: String,
    pub citations: u32,
}

/// Base graph statistics plus domain node counts, extraction counters and
/// most-cited listings.
#[derive(Debug, Clone, Serialize)]
pub struct DomainStatistics {
    pub graph: GraphStatistics,
    pub entities: usize,
    pub violations: usize,
    pub documents: usize,
    pub regulators: usize,
    pub penalties: usize,
    pub processed_documents: usize,
    pub extracted_entities: usize,
    pub extracted_relationships: usize,
    pub top_entities: Vec<TopNode>,
    pub top_violations: Vec<TopNode>,
}

const TOP_NODE_LIMIT: usize = 10;

impl GraphBuilder {
    /// All violations attached to an entity, one entry per edge.
    ///
    /// An unknown entity name resolves to an empty list, never an error.
    pub fn find_entity_violations(&self, entity_name: &str) -> Vec<EntityViolation> {
        let entity_id = normalize_id(entity_name, NodeType::Entity);
        if !self.store().contains_node(&entity_id) {
            return Vec::new();
        }

        let mut violations = Vec::new();
        for neighbor_id in self.store().get_neighbors(&entity_id, None) {
            let Some(neighbor) = self.store().get_node(&neighbor_id) else {
                continue;
            };
            if neighbor.node_type != NodeType::Violation {
                continue;
            }
            for edge in self.store().edges_between(&entity_id, &neighbor_id) {
                violations.push(EntityViolation {
                    violation: neighbor.name.clone(),
                    violation_id: neighbor_id.clone(),
                    relationship: edge.relationship.clone(),
                    confidence: edge.confidence,
                    context: edge.context.clone().unwrap_or_default(),
                });
            }
        }

        violations
    }

    /// Entities that committed the given violation, most-cited first.
    ///
    /// Ties keep node insertion order (stable sort). Results are truncated
    /// to `limit`.
    pub fn find_similar_cases(&self, violation_type: &str, limit: usize) -> Vec<SimilarCase> {
        let violation_id = normalize_id(violation_type, NodeType::Violation);
        if !self.store().contains_node(&violation_id) {
            return Vec::new();
        }

        let wanted = violation_type.to_lowercase();
        let mut cases = Vec::new();

        for entity_id in self.store().find_nodes_by_type(NodeType::Entity) {
            let Some(node) = self.store().get_node(&entity_id) else {
                continue;
            };
            for violation in self.find_entity_violations(&node.name) {
                if violation.violation.to_lowercase() == wanted {
                    cases.push(SimilarCase {
                        entity: node.name.clone(),
                        entity_id: entity_id.clone(),
                        violation: violation.violation,
                        citation_count: node.citation_count,
                        documents: node.documents.clone(),
                    });
                }
            }
        }

        cases.sort_by(|a, b| b.citation_count.cmp(&a.citation_count));
        cases.truncate(limit);
        cases
    }

    /// Base statistics plus domain breakdowns and top-10 citation listings.
    pub fn get_domain_statistics(&self) -> DomainStatistics {
        let store = self.store();
        DomainStatistics {
            graph: store.get_statistics(),
            entities: store.find_nodes_by_type(NodeType::Entity).len(),
            violations: store.find_nodes_by_type(NodeType::Violation).len(),
            documents: store.find_nodes_by_type(NodeType::Document).len(),
            regulators: store.find_nodes_by_type(NodeType::Regulator).len(),
            penalties: store.find_nodes_by_type(NodeType::Penalty).len(),
            processed_documents: self.processed_documents(),
            extracted_entities: self.extracted_entities(),
            extracted_relationships: self.extracted_relationships(),
            top_entities: self.top_by_citations(NodeType::Entity),
            top_violations: self.top_by_citations(NodeType::Violation),
        }
    }

    /// Most-cited nodes of a type, descending; ties keep insertion order.
    fn top_by_citations(&self, node_type: NodeType) -> Vec<TopNode> {
        let mut nodes: Vec<TopNode> = self
            .store()
            .find_nodes_by_type(node_type)
            .into_iter()
            .filter_map(|id| {
                self.store().get_node(&id).map(|n| TopNode {
                    id,
                    name: n.name.clone(),
                    citations: n.citation_count,
                })
            })
            .collect();
        nodes.sort_by(|a, b| b.citations.cmp(&a.citations));
        nodes.truncate(TOP_NODE_LIMIT);
        nodes
    }
}

//! Knowledge graph module: typed multigraph store, bounded traversal and
//! node-link export.
//!
//! The store is domain-agnostic: it keys nodes by string id, keeps every
//! inserted edge (multigraph, no deduplication) and knows nothing about how
//! ids are derived. Domain policy lives in [`crate::builder`].

mod export;
mod store;
mod traversal;

pub use export::{ExportEdge, ExportMetadata, ExportNode, GraphExport};
pub use store::{GraphSnapshot, GraphStatistics, GraphStore};
pub use traversal::{PathStep, TraversalResult, TraversedEdge};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Node types stored in the graph.
///
/// The first five are the domain core (entities, violations, regulators,
/// documents, penalties); the rest arise from NER label mapping and
/// relationship-endpoint inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Entity,
    Person,
    Violation,
    Regulator,
    Document,
    Penalty,
    Date,
    Number,
    Location,
    Regulation,
    Unknown,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Entity => "Entity",
            NodeType::Person => "Person",
            NodeType::Violation => "Violation",
            NodeType::Regulator => "Regulator",
            NodeType::Document => "Document",
            NodeType::Penalty => "Penalty",
            NodeType::Date => "Date",
            NodeType::Number => "Number",
            NodeType::Location => "Location",
            NodeType::Regulation => "Regulation",
            NodeType::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship types used by the extraction and construction layers.
///
/// The store itself keys edges by plain string so it stays generic; these
/// constants give the domain layer one spelling for each relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationType {
    /// Entity → Violation
    Committed,
    /// Entity → Regulator
    PenalizedBy,
    /// Case → Case
    SimilarTo,
    /// Entity → Penalty
    ReceivedPenalty,
    /// Entity → Document (added during graph construction)
    CitedIn,
    /// Document → Violation (added during graph construction)
    Describes,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Committed => "COMMITTED",
            RelationType::PenalizedBy => "PENALIZED_BY",
            RelationType::SimilarTo => "SIMILAR_TO",
            RelationType::ReceivedPenalty => "RECEIVED_PENALTY",
            RelationType::CitedIn => "CITED_IN",
            RelationType::Describes => "DESCRIBES",
        }
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata carried only by `NodeType::Document` nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub title: String,
    pub document_type: String,
    pub chunk_index: u32,
    pub date: Option<NaiveDate>,
    pub url: Option<String>,
    /// First part of the document content, for display.
    pub content_preview: String,
}

/// A node in the knowledge graph.
///
/// `citation_count` and `documents` track how many distinct documents cite
/// the node; both are maintained by the builder's merge logic, never by the
/// store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub node_type: NodeType,
    pub name: String,
    pub confidence: f32,
    pub citation_count: u32,
    /// Document node ids citing this node. No duplicates; insertion order.
    pub documents: Vec<String>,
    pub context: Option<String>,
    /// Present only on Document nodes.
    pub document: Option<DocumentMeta>,
    pub created_at: DateTime<Utc>,
}

impl Node {
    /// Build a mention node (entity, violation, regulator, penalty, ...)
    /// first cited by `document_id`.
    pub fn mention(
        id: impl Into<String>,
        node_type: NodeType,
        name: impl Into<String>,
        confidence: f32,
        context: Option<String>,
        document_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            node_type,
            name: name.into(),
            confidence,
            citation_count: 1,
            documents: vec![document_id.into()],
            context,
            document: None,
            created_at: Utc::now(),
        }
    }

    /// Build a document node from chunk metadata.
    pub fn document(id: impl Into<String>, meta: DocumentMeta) -> Self {
        Self {
            id: id.into(),
            node_type: NodeType::Document,
            name: meta.title.clone(),
            confidence: 1.0,
            citation_count: 1,
            documents: Vec::new(),
            context: None,
            document: Some(meta),
            created_at: Utc::now(),
        }
    }

    /// Look up a scannable property by name, for generic property queries.
    pub fn property(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.name.clone()),
            "type" => Some(self.node_type.to_string()),
            "context" => self.context.clone(),
            "title" => self.document.as_ref().map(|d| d.title.clone()),
            "document_type" => self.document.as_ref().map(|d| d.document_type.clone()),
            "url" => self.document.as_ref().and_then(|d| d.url.clone()),
            _ => None,
        }
    }
}

/// An edge in the knowledge graph (source --relationship--> target).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    /// Relationship name, e.g. `COMMITTED`, `CITED_IN`.
    pub relationship: String,
    pub confidence: f32,
    pub context: Option<String>,
    /// Document node the relationship was extracted from.
    pub source_document: Option<String>,
    /// Provenance tag, `"metadata"` for edges derived from document metadata
    /// rather than free-text extraction.
    pub origin: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Edge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relationship: RelationType,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relationship: relationship.as_str().to_string(),
            confidence: 1.0,
            context: None,
            source_document: None,
            origin: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_source_document(mut self, document_id: impl Into<String>) -> Self {
        self.source_document = Some(document_id.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_display() {
        assert_eq!(NodeType::Entity.to_string(), "Entity");
        assert_eq!(NodeType::Violation.to_string(), "Violation");
        assert_eq!(NodeType::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn test_relation_type_wire_names() {
        assert_eq!(RelationType::Committed.as_str(), "COMMITTED");
        assert_eq!(RelationType::PenalizedBy.as_str(), "PENALIZED_BY");
        assert_eq!(RelationType::CitedIn.as_str(), "CITED_IN");
        assert_eq!(RelationType::Describes.as_str(), "DESCRIBES");
    }

    #[test]
    fn test_mention_node_starts_with_one_citation() {
        let node = Node::mention(
            "Entity_acme_ltd",
            NodeType::Entity,
            "Acme Ltd",
            0.85,
            None,
            "doc_1_0",
        );
        assert_eq!(node.citation_count, 1);
        assert_eq!(node.documents, vec!["doc_1_0".to_string()]);
        assert!(node.document.is_none());
    }

    #[test]
    fn test_document_node_carries_meta() {
        let meta = DocumentMeta {
            title: "Adjudication order".to_string(),
            document_type: "order".to_string(),
            chunk_index: 0,
            date: None,
            url: None,
            content_preview: "In the matter of".to_string(),
        };
        let node = Node::document("doc_ord1_0", meta);
        assert_eq!(node.node_type, NodeType::Document);
        assert_eq!(node.name, "Adjudication order");
        assert!(node.documents.is_empty());
    }

    #[test]
    fn test_node_property_lookup() {
        let node = Node::mention(
            "Violation_insider_trading",
            NodeType::Violation,
            "insider trading",
            0.9,
            Some("found guilty of insider trading".to_string()),
            "doc_1_0",
        );
        assert_eq!(node.property("name").as_deref(), Some("insider trading"));
        assert_eq!(node.property("type").as_deref(), Some("Violation"));
        assert_eq!(node.property("title"), None);
        assert_eq!(node.property("nonexistent"), None);
    }

    #[test]
    fn test_edge_builder_chain() {
        let edge = Edge::new("Entity_a", "Violation_b", RelationType::Committed)
            .with_confidence(0.7)
            .with_context("A committed b")
            .with_source_document("doc_1_0");
        assert_eq!(edge.relationship, "COMMITTED");
        assert_eq!(edge.confidence, 0.7);
        assert_eq!(edge.source_document.as_deref(), Some("doc_1_0"));
        assert!(edge.origin.is_none());
    }
}

//! Domain graph construction: per-document extraction, identity
//! normalization and incremental citation merging.

mod queries;

pub use queries::{DomainStatistics, EntityViolation, SimilarCase, TopNode};

use serde::Serialize;

use crate::error::Result;
use crate::extract::{Extractor, RawEntity};
use crate::graph::{DocumentMeta, Edge, GraphStore, Node, NodeType, RelationType};
use crate::ingest::DocumentChunk;

/// Bytes of document content kept as the document node preview.
const CONTENT_PREVIEW_BYTES: usize = 200;

/// Per-type entity counts for one processed document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionSummary {
    pub companies: usize,
    pub violations: usize,
    pub penalties: usize,
    pub people: usize,
}

/// Result of processing a single document chunk.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    /// Document node id, absent when the document was skipped or failed.
    pub doc_node_id: Option<String>,
    pub entities_added: usize,
    pub relationships_added: usize,
    pub summary: ExtractionSummary,
    pub error: Option<String>,
}

impl DocumentResult {
    fn skipped() -> Self {
        Self {
            doc_node_id: None,
            entities_added: 0,
            relationships_added: 0,
            summary: ExtractionSummary::default(),
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            doc_node_id: None,
            entities_added: 0,
            relationships_added: 0,
            summary: ExtractionSummary::default(),
            error: Some(error),
        }
    }
}

/// Result of a batch run. Always produced, even when documents failed.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Number of input documents, failed ones included.
    pub documents_processed: usize,
    pub total_entities: usize,
    pub total_relationships: usize,
    pub errors: usize,
    pub results: Vec<DocumentResult>,
}

/// Builds the knowledge graph from a document stream.
///
/// Owns no graph state beyond the store it was given and running
/// extraction counters. Processing is strictly sequential; the store
/// assumes single-writer access for the whole batch window.
pub struct GraphBuilder {
    store: GraphStore,
    extractor: Extractor,
    processed_documents: usize,
    extracted_entities: usize,
    extracted_relationships: usize,
}

/// Derive the deterministic, type-prefixed id under which mentions of an
/// entity merge: lowercase, trim, spaces to underscores, strip everything
/// that is not alphanumeric or underscore, prefix with the type name.
///
/// This is the sole merge key; two mentions share a node exactly when
/// their normalized ids are equal.
pub fn normalize_id(text: &str, node_type: NodeType) -> String {
    let normalized: String = text
        .to_lowercase()
        .trim()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    format!("{node_type}_{normalized}")
}

impl GraphBuilder {
    /// Build over an explicitly constructed store and extractor.
    pub fn new(store: GraphStore, extractor: Extractor) -> Self {
        Self {
            store,
            extractor,
            processed_documents: 0,
            extracted_entities: 0,
            extracted_relationships: 0,
        }
    }

    /// Fresh graph with the built-in lexicon recognizer.
    pub fn with_defaults(graph_name: impl Into<String>) -> Result<Self> {
        Ok(Self::new(
            GraphStore::new(graph_name),
            Extractor::with_default_ner()?,
        ))
    }

    /// Continue building on top of a previously loaded store.
    pub fn from_store(store: GraphStore) -> Result<Self> {
        Ok(Self::new(store, Extractor::with_default_ner()?))
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GraphStore {
        &mut self.store
    }

    pub fn into_store(self) -> GraphStore {
        self.store
    }

    pub fn processed_documents(&self) -> usize {
        self.processed_documents
    }

    pub fn extracted_entities(&self) -> usize {
        self.extracted_entities
    }

    pub fn extracted_relationships(&self) -> usize {
        self.extracted_relationships
    }

    /// Wipe the graph and counters for a rebuild.
    pub fn clear(&mut self) {
        self.store.clear();
        self.processed_documents = 0;
        self.extracted_entities = 0;
        self.extracted_relationships = 0;
    }

    /// Process one document chunk into the graph.
    ///
    /// Creates the document node, runs extraction over the content, merges
    /// every mention into its normalized node, links citations, inserts
    /// relationship edges, and finally folds in the pre-classified metadata
    /// entities and violation types.
    ///
    /// A document with empty content is skipped with zero counts, not an
    /// error.
    pub fn process_document(&mut self, doc: &DocumentChunk) -> Result<DocumentResult> {
        if doc.content.trim().is_empty() {
            log::warn!(
                "Skipping document {} chunk {}: empty content",
                doc.document_id,
                doc.chunk_index
            );
            return Ok(DocumentResult::skipped());
        }

        let doc_node_id = format!("doc_{}_{}", doc.document_id, doc.chunk_index);
        self.store.add_node(Node::document(
            doc_node_id.clone(),
            DocumentMeta {
                title: doc.title.clone(),
                document_type: doc.document_type.clone(),
                chunk_index: doc.chunk_index,
                date: doc.date,
                url: doc.url.clone(),
                content_preview: content_preview(&doc.content),
            },
        ));

        let extraction = self.extractor.extract(&doc.content)?;

        for entity in &extraction.entities {
            let entity_id = self.merge_mention(
                &entity.text,
                entity.entity_type,
                entity.confidence,
                Some(entity.context.clone()),
                &doc_node_id,
            );
            self.store.add_edge(
                Edge::new(entity_id, doc_node_id.clone(), RelationType::CitedIn)
                    .with_confidence(entity.confidence),
            )?;
        }

        for relationship in &extraction.relationships {
            let source_id = self.resolve_endpoint(
                &relationship.source_text,
                relationship.source_type,
                relationship.confidence,
                &doc_node_id,
            );
            let target_id = self.resolve_endpoint(
                &relationship.target_text,
                relationship.target_type,
                relationship.confidence,
                &doc_node_id,
            );
            self.store.add_edge(
                Edge::new(source_id, target_id, relationship.relation)
                    .with_confidence(relationship.confidence)
                    .with_context(relationship.context.clone())
                    .with_source_document(doc_node_id.clone()),
            )?;
        }

        self.process_metadata(doc, &doc_node_id)?;

        self.processed_documents += 1;
        self.extracted_entities += extraction.entities.len();
        self.extracted_relationships += extraction.relationships.len();

        log::info!(
            "Processed document {}: {} entities, {} relationships",
            doc_node_id,
            extraction.entities.len(),
            extraction.relationships.len()
        );

        Ok(DocumentResult {
            doc_node_id: Some(doc_node_id),
            entities_added: extraction.entities.len(),
            relationships_added: extraction.relationships.len(),
            summary: summarize(&extraction.entities),
            error: None,
        })
    }

    /// Process documents sequentially. A failure on one document is caught,
    /// counted and logged; it never aborts the batch or disturbs graph
    /// state committed by earlier documents.
    pub fn process_batch(&mut self, docs: &[DocumentChunk]) -> BatchResult {
        let mut results = Vec::with_capacity(docs.len());
        let mut total_entities = 0;
        let mut total_relationships = 0;
        let mut errors = 0;

        log::info!("Processing batch of {} documents", docs.len());

        for (i, doc) in docs.iter().enumerate() {
            if (i + 1) % 10 == 0 {
                log::info!("Progress: {}/{} documents processed", i + 1, docs.len());
            }

            match self.process_document(doc) {
                Ok(result) => {
                    total_entities += result.entities_added;
                    total_relationships += result.relationships_added;
                    results.push(result);
                }
                Err(e) => {
                    log::error!(
                        "Error processing document {} chunk {}: {}",
                        doc.document_id,
                        doc.chunk_index,
                        e
                    );
                    errors += 1;
                    results.push(DocumentResult::failed(e.to_string()));
                }
            }
        }

        log::info!(
            "Batch processing complete: {} documents, {} entities, {} relationships, {} errors",
            docs.len(),
            total_entities,
            total_relationships,
            errors
        );

        BatchResult {
            documents_processed: docs.len(),
            total_entities,
            total_relationships,
            errors,
            results,
        }
    }

    /// Merge one mention into its normalized node.
    ///
    /// A citation is counted once per distinct citing document: the count
    /// and the `documents` set move together, so reprocessing the same
    /// document id is idempotent.
    fn merge_mention(
        &mut self,
        text: &str,
        node_type: NodeType,
        confidence: f32,
        context: Option<String>,
        doc_node_id: &str,
    ) -> String {
        let id = normalize_id(text, node_type);
        match self.store.get_node_mut(&id) {
            Some(node) => {
                if !node.documents.iter().any(|d| d == doc_node_id) {
                    node.documents.push(doc_node_id.to_string());
                    node.citation_count += 1;
                }
            }
            None => {
                self.store.add_node(Node::mention(
                    id.clone(),
                    node_type,
                    text,
                    confidence,
                    context,
                    doc_node_id,
                ));
            }
        }
        id
    }

    /// Resolve a relationship endpoint to a node id, creating a stub node
    /// when the endpoint was not separately extracted as an entity.
    fn resolve_endpoint(
        &mut self,
        text: &str,
        node_type: NodeType,
        confidence: f32,
        doc_node_id: &str,
    ) -> String {
        let id = normalize_id(text, node_type);
        if !self.store.contains_node(&id) {
            self.store.add_node(Node::mention(
                id.clone(),
                node_type,
                text,
                confidence,
                None,
                doc_node_id,
            ));
        }
        id
    }

    /// Fold in the document's own pre-classified metadata, independent of
    /// free-text extraction. Edges created here carry the `metadata`
    /// provenance tag.
    fn process_metadata(&mut self, doc: &DocumentChunk, doc_node_id: &str) -> Result<()> {
        for violation_type in &doc.violation_types {
            let violation_id =
                self.merge_mention(violation_type, NodeType::Violation, 1.0, None, doc_node_id);
            self.store.add_edge(
                Edge::new(doc_node_id, violation_id, RelationType::Describes)
                    .with_origin("metadata"),
            )?;
        }

        for entity_name in &doc.entities {
            let entity_id =
                self.merge_mention(entity_name, NodeType::Entity, 1.0, None, doc_node_id);
            self.store.add_edge(
                Edge::new(entity_id, doc_node_id, RelationType::CitedIn).with_origin("metadata"),
            )?;
        }

        Ok(())
    }
}

fn summarize(entities: &[RawEntity]) -> ExtractionSummary {
    let mut summary = ExtractionSummary::default();
    for entity in entities {
        match entity.entity_type {
            NodeType::Entity => summary.companies += 1,
            NodeType::Violation => summary.violations += 1,
            NodeType::Penalty => summary.penalties += 1,
            NodeType::Person => summary.people += 1,
            _ => {}
        }
    }
    summary
}

/// First part of the content, snapped to a char boundary.
fn content_preview(content: &str) -> String {
    if content.len() <= CONTENT_PREVIEW_BYTES {
        return content.to_string();
    }
    let mut end = CONTENT_PREVIEW_BYTES;
    while end > 0 && !content.is_char_boundary(end) {
        end -= 1;
    }
    content[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReggraphError;
    use crate::extract::{NamedEntityRecognizer, NerSpan};

    fn chunk(document_id: &str, chunk_index: u32, content: &str) -> DocumentChunk {
        DocumentChunk {
            document_id: document_id.to_string(),
            chunk_index,
            title: format!("{document_id} title"),
            document_type: "adjudication_order".to_string(),
            date: None,
            url: None,
            content: content.to_string(),
            violation_types: Vec::new(),
            entities: Vec::new(),
        }
    }

    const SCENARIO: &str = "XYZ Industries Ltd. was found guilty of insider trading. \
         SEBI imposed a penalty of ₹50,00,000 on XYZ Industries Ltd.";

    #[test]
    fn test_normalize_id_shape() {
        assert_eq!(
            normalize_id("XYZ Industries Ltd.", NodeType::Entity),
            "Entity_xyz_industries_ltd"
        );
        assert_eq!(
            normalize_id("insider trading", NodeType::Violation),
            "Violation_insider_trading"
        );
        assert_eq!(normalize_id("₹50,00,000", NodeType::Penalty), "Penalty_5000000");
    }

    #[test]
    fn test_normalize_id_deterministic() {
        let first = normalize_id("  Apex Commodities Ltd. ", NodeType::Entity);
        let second = normalize_id("  Apex Commodities Ltd. ", NodeType::Entity);
        assert_eq!(first, second);
        // Case and punctuation variants merge to the same id
        assert_eq!(
            normalize_id("APEX COMMODITIES LTD", NodeType::Entity),
            first
        );
    }

    #[test]
    fn test_process_document_scenario_graph() {
        let mut builder = GraphBuilder::with_defaults("scenario_test").unwrap();
        let result = builder.process_document(&chunk("case1", 0, SCENARIO)).unwrap();

        assert_eq!(result.doc_node_id.as_deref(), Some("doc_case1_0"));
        assert!(result.entities_added >= 3);

        let store = builder.store();
        let entity = store.get_node("Entity_xyz_industries_ltd").expect("entity node");
        assert_eq!(entity.node_type, NodeType::Entity);
        assert!(store.contains_node("Violation_insider_trading"));
        let penalties = store.find_nodes_by_type(NodeType::Penalty);
        assert!(penalties.iter().any(|id| id.contains("5000000")));

        // COMMITTED edge entity -> violation
        let committed = store.get_neighbors("Entity_xyz_industries_ltd", Some("COMMITTED"));
        assert!(committed.contains(&"Violation_insider_trading".to_string()));

        // A penalty edge referencing the amount
        let received: Vec<_> = store
            .find_nodes_by_type(NodeType::Penalty)
            .iter()
            .flat_map(|id| store.get_neighbors(id, Some("RECEIVED_PENALTY")))
            .collect();
        assert!(!received.is_empty());

        // Every extracted entity is cited in the document
        let cited = store.get_neighbors("Entity_xyz_industries_ltd", Some("CITED_IN"));
        assert!(cited.contains(&"doc_case1_0".to_string()));
    }

    #[test]
    fn test_citation_count_across_documents() {
        let mut builder = GraphBuilder::with_defaults("citation_test").unwrap();
        builder
            .process_document(&chunk("a", 0, "Apex Commodities Ltd. engaged in wash trading."))
            .unwrap();
        builder
            .process_document(&chunk("b", 0, "Apex Commodities Ltd. denied the charges of fraud."))
            .unwrap();

        let node = builder
            .store()
            .get_node("Entity_apex_commodities_ltd")
            .expect("merged entity node");
        assert_eq!(node.citation_count, 2);
        assert_eq!(node.documents.len(), 2);
        assert!(node.documents.contains(&"doc_a_0".to_string()));
        assert!(node.documents.contains(&"doc_b_0".to_string()));
    }

    #[test]
    fn test_reprocessing_same_document_is_idempotent_for_citations() {
        let mut builder = GraphBuilder::with_defaults("reprocess_test").unwrap();
        let doc = chunk("a", 0, "Apex Commodities Ltd. engaged in wash trading.");
        builder.process_document(&doc).unwrap();
        builder.process_document(&doc).unwrap();

        let node = builder
            .store()
            .get_node("Entity_apex_commodities_ltd")
            .unwrap();
        assert_eq!(node.citation_count, 1);
        assert_eq!(node.documents.len(), 1);
    }

    #[test]
    fn test_empty_content_is_skipped_not_error() {
        let mut builder = GraphBuilder::with_defaults("empty_test").unwrap();
        let result = builder.process_document(&chunk("a", 0, "   ")).unwrap();
        assert!(result.doc_node_id.is_none());
        assert_eq!(result.entities_added, 0);
        assert_eq!(builder.store().node_count(), 0);
        assert_eq!(builder.processed_documents(), 0);
    }

    #[test]
    fn test_metadata_entities_and_violations() {
        let mut builder = GraphBuilder::with_defaults("metadata_test").unwrap();
        let mut doc = chunk("m", 0, "The order covers the conduct described below.");
        doc.violation_types = vec!["front running".to_string()];
        doc.entities = vec!["Zenith Broking Ltd".to_string()];
        builder.process_document(&doc).unwrap();

        let store = builder.store();
        assert!(store.contains_node("Violation_front_running"));
        assert!(store.contains_node("Entity_zenith_broking_ltd"));

        let described = store.get_neighbors("doc_m_0", Some("DESCRIBES"));
        assert_eq!(described, vec!["Violation_front_running".to_string()]);

        let edges = store.edges_between("doc_m_0", "Violation_front_running");
        assert_eq!(edges[0].origin.as_deref(), Some("metadata"));

        let cited = store.get_neighbors("Entity_zenith_broking_ltd", Some("CITED_IN"));
        assert!(cited.contains(&"doc_m_0".to_string()));
    }

    /// Recognizer that fails on a marker string, for batch-isolation tests.
    struct FlakyNer;

    impl NamedEntityRecognizer for FlakyNer {
        fn recognize(&self, text: &str) -> crate::error::Result<Vec<NerSpan>> {
            if text.contains("POISON") {
                return Err(ReggraphError::Ner("backend unavailable".to_string()));
            }
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_batch_error_isolation() {
        let extractor = Extractor::new(Box::new(FlakyNer)).unwrap();
        let mut builder = GraphBuilder::new(GraphStore::new("batch_test"), extractor);

        let docs = vec![
            chunk("a", 0, "Apex Commodities Ltd. engaged in wash trading."),
            chunk("b", 0, "POISON document that breaks the recognizer."),
            chunk("c", 0, "Zenith Broking Ltd. committed fraud repeatedly."),
        ];
        let result = builder.process_batch(&docs);

        assert_eq!(result.documents_processed, 3);
        assert_eq!(result.errors, 1);
        assert!(result.results[1].error.is_some());
        assert!(result.results[0].error.is_none());
        // Documents before and after the failure still contributed
        assert!(builder.store().contains_node("doc_a_0"));
        assert!(builder.store().contains_node("doc_c_0"));
        assert!(builder.store().contains_node("Entity_apex_commodities_ltd"));
    }

    #[test]
    fn test_batch_summary_totals() {
        let mut builder = GraphBuilder::with_defaults("totals_test").unwrap();
        let docs = vec![
            chunk("a", 0, "Apex Commodities Ltd. engaged in wash trading."),
            chunk("a", 1, "The matter involved market manipulation by brokers."),
        ];
        let result = builder.process_batch(&docs);

        assert_eq!(result.documents_processed, 2);
        assert_eq!(result.errors, 0);
        let summed: usize = result.results.iter().map(|r| r.entities_added).sum();
        assert_eq!(result.total_entities, summed);
        assert_eq!(builder.processed_documents(), 2);
    }

    #[test]
    fn test_clear_resets_graph_and_counters() {
        let mut builder = GraphBuilder::with_defaults("clear_test").unwrap();
        builder
            .process_document(&chunk("a", 0, "Apex Commodities Ltd. engaged in wash trading."))
            .unwrap();
        builder.clear();
        assert_eq!(builder.store().node_count(), 0);
        assert_eq!(builder.processed_documents(), 0);
    }

    #[test]
    fn test_content_preview_char_boundary() {
        let long = "₹".repeat(120);
        let preview = content_preview(&long);
        assert!(preview.chars().all(|c| c == '₹'));
        assert!(preview.len() <= CONTENT_PREVIEW_BYTES);
    }
}

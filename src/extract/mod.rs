//! Entity and relationship extraction from enforcement document text.
//!
//! Extraction is a pure function over a text span: NER spans plus domain
//! pattern matches become candidate entities, and a fixed table of regex
//! templates yields candidate relationships. No graph state is touched
//! here; merging repeated mentions is the builder's job.

mod ner;
mod relations;

pub use ner::{LexiconNer, NamedEntityRecognizer, NerSpan};

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::graph::{NodeType, RelationType};

/// Violation phrase vocabulary, matched case-insensitively as Violation
/// entities and consulted during relationship endpoint inference.
pub(crate) const VIOLATION_VOCAB: &[&str] = &[
    "insider trading",
    "market manipulation",
    "price rigging",
    "wash trading",
    "front running",
    "churning",
    "pump and dump",
    "ponzi scheme",
    "fraud",
    "misrepresentation",
    "disclosure violation",
    "circular trading",
    "matched orders",
    "fictitious trades",
    "false market",
    "spoofing",
    "layering",
    "corporate governance",
    "money laundering",
    "unfair trade practice",
    "market abuse",
];

/// Generic legal/procedural terms rejected as entities regardless of type.
const ENTITY_STOPWORDS: &[&str] = &[
    "inter alia",
    "individuals",
    "companies",
    "parties",
    "entities",
    "persons",
    "appellant",
    "respondent",
    "petitioner",
    "noticee",
    "scn",
    "etc",
    "viz",
    "vide",
    "ibid",
    "supra",
    "infra",
    "show cause notice",
    "interim order",
    "final order",
    "adjudication order",
    "settlement order",
    "consent order",
    "applicant",
    "appellee",
    "claimant",
    "defendant",
    "case",
    "matter",
    "proceedings",
    "order",
    "notice",
    "regulation",
    "provision",
    "clause",
    "section",
    "act",
    "board",
    "tribunal",
    "authority",
    "commission",
    "the company",
    "the entity",
    "the person",
    "the individual",
    "said",
    "same",
    "aforesaid",
    "aforementioned",
];

const DATE_CONTEXT_KEYWORDS: &[&str] = &[
    "order",
    "violation",
    "penalty",
    "dated",
    "adjudication",
    "enforcement",
];

const NUMBER_CONTEXT_KEYWORDS: &[&str] = &[
    "₹", "rupees", "lakh", "crore", "penalty", "fine", "amount", "rs",
];

/// A candidate entity extracted from one text span. Transient; consumed by
/// the builder immediately after extraction.
#[derive(Debug, Clone)]
pub struct RawEntity {
    pub text: String,
    pub entity_type: NodeType,
    pub start: usize,
    pub end: usize,
    pub confidence: f32,
    pub context: String,
}

/// A candidate relationship between two entity strings.
#[derive(Debug, Clone)]
pub struct RawRelationship {
    pub source_text: String,
    pub source_type: NodeType,
    pub relation: RelationType,
    pub target_text: String,
    pub target_type: NodeType,
    pub confidence: f32,
    pub context: String,
}

/// Everything extracted from one document text.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    pub entities: Vec<RawEntity>,
    pub relationships: Vec<RawRelationship>,
}

/// Entity and relationship extractor.
///
/// All patterns are compiled at construction; a compile or NER-load failure
/// there is fatal, so an extractor can never exist half-initialized.
pub struct Extractor {
    ner: Box<dyn NamedEntityRecognizer>,
    violation_patterns: Vec<Regex>,
    penalty_patterns: Vec<Regex>,
    company_patterns: Vec<Regex>,
    relations: relations::RelationPatterns,
    stopwords: HashSet<&'static str>,
    config: ExtractionConfig,
}

impl Extractor {
    /// Build an extractor with the given NER backend and default tuning.
    pub fn new(ner: Box<dyn NamedEntityRecognizer>) -> Result<Self> {
        Self::with_config(ner, ExtractionConfig::default())
    }

    /// Build an extractor with the built-in lexicon recognizer.
    pub fn with_default_ner() -> Result<Self> {
        Self::new(Box::new(LexiconNer::new()?))
    }

    pub fn with_config(ner: Box<dyn NamedEntityRecognizer>, config: ExtractionConfig) -> Result<Self> {
        let violation_patterns = VIOLATION_VOCAB
            .iter()
            .map(|phrase| Regex::new(&format!("(?i){}", regex::escape(phrase))))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let penalty_patterns = [
            r"(?i)₹\s*\d+(?:,\d+)*(?:\.\d+)?\s*(?:lakh|crore|L|Cr)?",
            r"(?i)INR\s*\d+(?:,\d+)*(?:\.\d+)?",
            r"(?i)penalty of ₹[\d,.]+",
        ]
        .iter()
        .map(|p| Regex::new(p))
        .collect::<std::result::Result<Vec<_>, _>>()?;

        let company_patterns = [
            r"[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\s+(?:Ltd\.|Limited|Corporation|Corp\.|Inc\.|Private Limited|Pvt\.?\s*Ltd\.?)",
            r"[A-Z][A-Za-z]+(?:\s+[A-Z][A-Za-z]+)+\s+(?:Ltd\.|Limited)",
            r"[A-Z][A-Z]+\s+(?:Ltd\.|Limited|Corporation|Corp\.)",
        ]
        .iter()
        .map(|p| Regex::new(p))
        .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            ner,
            violation_patterns,
            penalty_patterns,
            company_patterns,
            relations: relations::RelationPatterns::compile()?,
            stopwords: ENTITY_STOPWORDS.iter().copied().collect(),
            config,
        })
    }

    /// Extract candidate entities and relationships from one text span.
    ///
    /// Never fails on malformed or empty input; empty input yields empty
    /// lists. An NER runtime error is surfaced for the caller to recover
    /// per document.
    pub fn extract(&self, text: &str) -> Result<ExtractionResult> {
        if text.trim().is_empty() {
            return Ok(ExtractionResult::default());
        }

        let entities = self.extract_entities(text)?;
        let relationships = self.relations.extract(
            text,
            &entities,
            VIOLATION_VOCAB,
            self.config.relationship_context_chars,
        );

        log::debug!(
            "Extracted {} entities, {} relationships",
            entities.len(),
            relationships.len()
        );

        Ok(ExtractionResult {
            entities,
            relationships,
        })
    }

    fn extract_entities(&self, text: &str) -> Result<Vec<RawEntity>> {
        let mut entities = Vec::new();
        let window = self.config.entity_context_chars;

        // NER spans mapped into the domain type set; unmapped labels dropped
        for span in self.ner.recognize(text)? {
            if let Some(entity_type) = map_ner_label(&span.label) {
                entities.push(RawEntity {
                    text: span.text,
                    entity_type,
                    start: span.start,
                    end: span.end,
                    confidence: 0.8,
                    context: context_window(text, span.start, span.end, window),
                });
            }
        }

        // Violation phrases, complementary to NER output
        for pattern in &self.violation_patterns {
            for m in pattern.find_iter(text) {
                entities.push(RawEntity {
                    text: m.as_str().to_string(),
                    entity_type: NodeType::Violation,
                    start: m.start(),
                    end: m.end(),
                    confidence: 0.9,
                    context: context_window(text, m.start(), m.end(), window),
                });
            }
        }

        // Currency amounts
        for pattern in &self.penalty_patterns {
            for m in pattern.find_iter(text) {
                entities.push(RawEntity {
                    text: m.as_str().to_string(),
                    entity_type: NodeType::Penalty,
                    start: m.start(),
                    end: m.end(),
                    confidence: 0.95,
                    context: context_window(text, m.start(), m.end(), window),
                });
            }
        }

        // Company names with a legal suffix
        for pattern in &self.company_patterns {
            for m in pattern.find_iter(text) {
                let name = m.as_str();
                if self.stopwords.contains(name.to_lowercase().as_str()) {
                    continue;
                }
                // Single-word matches are usually artifacts unless all-caps
                if name.split_whitespace().count() < 2 && !is_all_uppercase(name) {
                    continue;
                }
                entities.push(RawEntity {
                    text: name.to_string(),
                    entity_type: NodeType::Entity,
                    start: m.start(),
                    end: m.end(),
                    confidence: 0.85,
                    context: context_window(text, m.start(), m.end(), window),
                });
            }
        }

        let deduplicated = deduplicate_entities(entities);
        let kept: Vec<RawEntity> = deduplicated
            .into_iter()
            .filter(|e| self.should_keep(e))
            .collect();

        Ok(kept)
    }

    /// Quality filter applied after deduplication.
    ///
    /// Stopwords and very short strings are rejected regardless of type.
    /// Violation/Penalty/Regulator are otherwise always kept; Date and
    /// Number only survive with an enforcement- or currency-relevant
    /// context window.
    pub(crate) fn should_keep(&self, entity: &RawEntity) -> bool {
        let lower = entity.text.to_lowercase();
        if self.stopwords.contains(lower.trim()) {
            return false;
        }
        if entity.text.chars().count() < self.config.min_entity_length {
            return false;
        }

        match entity.entity_type {
            NodeType::Violation | NodeType::Penalty | NodeType::Regulator => true,
            NodeType::Date => {
                let context = entity.context.to_lowercase();
                DATE_CONTEXT_KEYWORDS.iter().any(|k| context.contains(k))
            }
            NodeType::Number => {
                let context = entity.context.to_lowercase();
                NUMBER_CONTEXT_KEYWORDS.iter().any(|k| context.contains(k))
            }
            _ => true,
        }
    }
}

/// Map a NER label into the domain type set. Unmapped labels are dropped.
fn map_ner_label(label: &str) -> Option<NodeType> {
    match label {
        "ORG" => Some(NodeType::Entity),
        "PERSON" => Some(NodeType::Person),
        "GPE" => Some(NodeType::Location),
        "MONEY" => Some(NodeType::Penalty),
        "DATE" => Some(NodeType::Date),
        "CARDINAL" => Some(NodeType::Number),
        "LAW" => Some(NodeType::Regulation),
        _ => None,
    }
}

/// Group by case-insensitive text and keep the highest-confidence entity of
/// each group, preserving first-occurrence order. Within one extraction
/// call only; cross-document merging happens in the builder.
fn deduplicate_entities(entities: Vec<RawEntity>) -> Vec<RawEntity> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut deduplicated: Vec<RawEntity> = Vec::new();

    for entity in entities {
        let key = entity.text.to_lowercase();
        match index.get(&key) {
            Some(&i) => {
                if entity.confidence > deduplicated[i].confidence {
                    deduplicated[i] = entity;
                }
            }
            None => {
                index.insert(key, deduplicated.len());
                deduplicated.push(entity);
            }
        }
    }

    deduplicated
}

fn is_all_uppercase(text: &str) -> bool {
    let mut has_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            has_alpha = true;
            if !c.is_uppercase() {
                return false;
            }
        }
    }
    has_alpha
}

/// Slice a context window of roughly `window` bytes either side of the
/// span, snapped outward to UTF-8 character boundaries.
pub(crate) fn context_window(text: &str, start: usize, end: usize, window: usize) -> String {
    let mut from = start.saturating_sub(window);
    while from > 0 && !text.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = end.saturating_add(window).min(text.len());
    while to < text.len() && !text.is_char_boundary(to) {
        to += 1;
    }
    text[from..to].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Extractor {
        Extractor::with_default_ner().unwrap()
    }

    const SCENARIO: &str = "XYZ Industries Ltd. was found guilty of insider trading. \
         SEBI imposed a penalty of ₹50,00,000 on XYZ Industries Ltd.";

    #[test]
    fn test_empty_input_yields_empty_result() {
        let result = extractor().extract("").unwrap();
        assert!(result.entities.is_empty());
        assert!(result.relationships.is_empty());
        let result = extractor().extract("   \n\t ").unwrap();
        assert!(result.entities.is_empty());
    }

    #[test]
    fn test_scenario_entities() {
        let result = extractor().extract(SCENARIO).unwrap();

        let company = result
            .entities
            .iter()
            .find(|e| e.text.starts_with("XYZ Industries"))
            .expect("company entity");
        assert_eq!(company.entity_type, NodeType::Entity);
        assert_eq!(company.confidence, 0.85);

        let violation = result
            .entities
            .iter()
            .find(|e| e.text.eq_ignore_ascii_case("insider trading"))
            .expect("violation entity");
        assert_eq!(violation.entity_type, NodeType::Violation);
        assert_eq!(violation.confidence, 0.9);

        let penalty = result
            .entities
            .iter()
            .find(|e| e.entity_type == NodeType::Penalty && e.text.contains("50,00,000"))
            .expect("penalty entity");
        assert_eq!(penalty.confidence, 0.95);

        assert!(result.entities.iter().any(|e| e.text == "SEBI"));
    }

    #[test]
    fn test_scenario_relationships() {
        let result = extractor().extract(SCENARIO).unwrap();

        let committed = result
            .relationships
            .iter()
            .find(|r| r.relation == RelationType::Committed)
            .expect("COMMITTED relationship");
        assert!(committed.source_text.starts_with("XYZ Industries"));
        assert_eq!(committed.target_text.to_lowercase(), "insider trading");

        assert!(result.relationships.iter().any(|r| {
            r.relation == RelationType::ReceivedPenalty && r.source_text.contains("50,00,000")
        }));
    }

    #[test]
    fn test_dedup_keeps_highest_confidence() {
        // "Apex Commodities Ltd." is found by both NER (0.8) and the company
        // pattern (0.85); only the pattern match survives
        let result = extractor()
            .extract("Apex Commodities Ltd. engaged in wash trading.")
            .unwrap();
        let hits: Vec<_> = result
            .entities
            .iter()
            .filter(|e| e.text.to_lowercase().contains("apex"))
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].confidence, 0.85);
    }

    #[test]
    fn test_stopword_rejected() {
        let extractor = extractor();
        let entity = RawEntity {
            text: "show cause notice".to_string(),
            entity_type: NodeType::Entity,
            start: 0,
            end: 17,
            confidence: 0.8,
            context: String::new(),
        };
        assert!(!extractor.should_keep(&entity));
    }

    #[test]
    fn test_short_entity_rejected() {
        let extractor = extractor();
        let entity = RawEntity {
            text: "ab".to_string(),
            entity_type: NodeType::Violation,
            start: 0,
            end: 2,
            confidence: 0.9,
            context: String::new(),
        };
        assert!(!extractor.should_keep(&entity));
    }

    #[test]
    fn test_date_kept_only_in_enforcement_context() {
        let result = extractor()
            .extract("The adjudication order dated 15 March 2023 was passed.")
            .unwrap();
        assert!(result
            .entities
            .iter()
            .any(|e| e.entity_type == NodeType::Date));

        let result = extractor()
            .extract("The annual picnic happened around 15 March 2023 near the lake.")
            .unwrap();
        assert!(!result
            .entities
            .iter()
            .any(|e| e.entity_type == NodeType::Date));
    }

    #[test]
    fn test_number_kept_only_near_currency_terms() {
        let result = extractor()
            .extract("a fine amount of 42,000 was recovered")
            .unwrap();
        assert!(result
            .entities
            .iter()
            .any(|e| e.entity_type == NodeType::Number));

        let result = extractor()
            .extract("attendance was 42,000 people strong that day")
            .unwrap();
        assert!(!result
            .entities
            .iter()
            .any(|e| e.entity_type == NodeType::Number));
    }

    #[test]
    fn test_violation_vocab_is_case_insensitive() {
        let result = extractor()
            .extract("charges of Market Manipulation were established")
            .unwrap();
        let violation = result
            .entities
            .iter()
            .find(|e| e.entity_type == NodeType::Violation)
            .unwrap();
        assert_eq!(violation.text, "Market Manipulation");
        assert_eq!(violation.confidence, 0.9);
    }

    #[test]
    fn test_context_window_respects_char_boundaries() {
        let text = "penalty of ₹50,00,000 imposed";
        let idx = text.find('₹').unwrap();
        // A window cutting into the middle of '₹' must snap outward
        let context = context_window(text, idx + 1, idx + 2, 4);
        assert!(context.contains('₹') || !context.is_empty());
        // No panic is the real assertion; also verify a plain window
        let context = context_window(text, 0, 7, 10);
        assert!(context.starts_with("penalty"));
    }

    #[test]
    fn test_map_ner_label() {
        assert_eq!(map_ner_label("ORG"), Some(NodeType::Entity));
        assert_eq!(map_ner_label("MONEY"), Some(NodeType::Penalty));
        assert_eq!(map_ner_label("LAW"), Some(NodeType::Regulation));
        assert_eq!(map_ner_label("WORK_OF_ART"), None);
    }
}

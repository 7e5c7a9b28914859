//! Relationship extraction: regex templates per relationship type plus
//! endpoint type inference.

use regex::Regex;

use crate::error::Result;
use crate::extract::{context_window, RawEntity, RawRelationship};
use crate::graph::{NodeType, RelationType};

/// Pattern-match confidence for relationships. Lower than the entity
/// pattern confidences: co-occurrence within a regex window is weaker
/// evidence than a direct phrase match.
const RELATIONSHIP_CONFIDENCE: f32 = 0.7;

/// Regulator names recognized during endpoint inference.
const KNOWN_REGULATORS: [&str; 4] = ["sebi", "rbi", "irdai", "pfrda"];

/// Compiled relationship templates, tried in a fixed order.
pub(crate) struct RelationPatterns {
    tables: Vec<(RelationType, Vec<Regex>)>,
}

impl RelationPatterns {
    /// Compile every template. A failure here is fatal to extractor
    /// construction.
    pub(crate) fn compile() -> Result<Self> {
        let specs: [(RelationType, &[&str]); 4] = [
            (
                RelationType::Committed,
                &[
                    r"(?i)([A-Z][A-Za-z\s&]+?(?:Ltd|Limited|Corporation|Corp|Inc)?\.?)\s+(?:committed|involved in|engaged in|indulged in)\s+(insider trading|fraud|market manipulation|[\w\s]+violation)",
                    r"(?i)([A-Z][A-Za-z\s&]+?(?:Ltd|Limited|Corporation|Corp|Inc)?\.?)\s+(?:was |were )?(?:found )?guilty of\s+(insider trading|fraud|market manipulation|[\w\s]+)",
                    r"(?i)([A-Z][A-Za-z\s&]+?)\s+(?:has |have )?violated\s+",
                    r"(?i)violations?\s+(?:by|of)\s+([A-Z][A-Za-z\s&]+?)\s+",
                ],
            ),
            (
                RelationType::PenalizedBy,
                &[
                    r"(?i)([A-Z][A-Za-z\s&]+?(?:Ltd|Limited|Corporation|Corp|Inc)?\.?)\s+(?:was |were )?(?:directed to pay|imposed with|penalized)\s+.*?(?:by\s+)?(SEBI|Securities and Exchange Board)",
                    r"(?i)(SEBI|Securities and Exchange Board).*?(?:imposed|directed|ordered)\s+.*?(?:penalty|fine|disgorgement)\s+(?:on|upon)\s+([A-Z][A-Za-z\s&]+)",
                    r"(?i)(SEBI|Securities and Exchange Board).*?(?:penalized|sanctioned)\s+([A-Z][A-Za-z\s&]+)",
                    r"(?i)([A-Z][A-Za-z\s&]+?)\s+(?:shall pay|directed to pay|ordered to pay).*?penalty",
                    r"(?i)penalty.*?imposed on\s+([A-Z][A-Za-z\s&]+)",
                ],
            ),
            (
                RelationType::SimilarTo,
                &[
                    r"(?i)similar to\s+(?:case\s+)?(?:no\.?\s*)?([A-Z]+[/-]\d+[/-]\d+)",
                    r"(?i)(?:akin|comparable|analogous) to\s+(?:the )?case\s+(?:of\s+)?([A-Z][A-Za-z\s&]+)",
                    r"(?i)(?:in line with|consistent with|following)\s+(?:case\s+)?([A-Z]+[/-]\d+)",
                    r"(?i)(?:vide|reference to|as in)\s+(?:case\s+)?(?:no\.?\s*)?([A-Z]+[/-]\d+)",
                ],
            ),
            (
                RelationType::ReceivedPenalty,
                &[
                    r"(?i)([A-Z][A-Za-z\s&]+?(?:Ltd|Limited)?\.?)\s+(?:was directed to pay|shall pay|ordered to pay)\s+(₹[\d,]+\s*(?:lakh|crore)?)",
                    r"(?i)penalty of\s+(₹[\d,]+\s*(?:lakh|crore)?)\s+(?:on|imposed on|upon)\s+([A-Z][A-Za-z\s&]+)",
                ],
            ),
        ];

        let mut tables = Vec::with_capacity(specs.len());
        for (relation, patterns) in specs {
            let mut compiled = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                compiled.push(Regex::new(pattern)?);
            }
            tables.push((relation, compiled));
        }

        Ok(Self { tables })
    }

    /// Run every template over the raw text. Templates with two capture
    /// groups yield (source, target); single-capture templates synthesize
    /// `current_case` as the source.
    pub(crate) fn extract(
        &self,
        text: &str,
        entities: &[RawEntity],
        violation_vocab: &[&str],
        context_chars: usize,
    ) -> Vec<RawRelationship> {
        let mut relationships = Vec::new();

        for (relation, patterns) in &self.tables {
            for pattern in patterns {
                let two_captures = pattern.captures_len() >= 3;
                for caps in pattern.captures_iter(text) {
                    let whole = caps.get(0).expect("capture 0 always present");
                    let (source_text, target_text) = if two_captures {
                        let source = match caps.get(1) {
                            Some(m) => m.as_str().trim(),
                            None => continue,
                        };
                        let target = match caps.get(2) {
                            Some(m) => m.as_str().trim(),
                            None => continue,
                        };
                        (source.to_string(), target.to_string())
                    } else {
                        let target = match caps.get(1) {
                            Some(m) => m.as_str().trim(),
                            None => continue,
                        };
                        ("current_case".to_string(), target.to_string())
                    };

                    let source_type = infer_entity_type(&source_text, entities, violation_vocab);
                    let target_type = infer_entity_type(&target_text, entities, violation_vocab);

                    relationships.push(RawRelationship {
                        source_text,
                        source_type,
                        relation: *relation,
                        target_text,
                        target_type,
                        confidence: RELATIONSHIP_CONFIDENCE,
                        context: context_window(text, whole.start(), whole.end(), context_chars),
                    });
                }
            }
        }

        relationships
    }
}

/// Infer the type of a relationship endpoint, first match wins:
/// already-extracted entity, known regulator, violation vocabulary,
/// leading-uppercase heuristic, then Unknown.
pub(crate) fn infer_entity_type(
    text: &str,
    entities: &[RawEntity],
    violation_vocab: &[&str],
) -> NodeType {
    let lower = text.to_lowercase();

    for entity in entities {
        if entity.text.to_lowercase() == lower {
            return entity.entity_type;
        }
    }

    if KNOWN_REGULATORS.contains(&lower.as_str()) {
        return NodeType::Regulator;
    }

    if violation_vocab.iter().any(|v| lower.contains(v)) {
        return NodeType::Violation;
    }

    if text.chars().next().map(char::is_uppercase).unwrap_or(false) {
        return NodeType::Entity;
    }

    NodeType::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::VIOLATION_VOCAB;

    fn extract(text: &str) -> Vec<RawRelationship> {
        RelationPatterns::compile()
            .unwrap()
            .extract(text, &[], VIOLATION_VOCAB, 100)
    }

    #[test]
    fn test_committed_guilty_of() {
        let rels = extract("XYZ Industries Ltd. was found guilty of insider trading.");
        let committed = rels
            .iter()
            .find(|r| r.relation == RelationType::Committed)
            .unwrap();
        assert_eq!(committed.source_text, "XYZ Industries Ltd.");
        assert_eq!(committed.target_text, "insider trading");
        assert_eq!(committed.target_type, NodeType::Violation);
        assert_eq!(committed.confidence, 0.7);
    }

    #[test]
    fn test_penalized_by_regulator() {
        let rels = extract("SEBI imposed a monetary penalty on Apex Commodities");
        let penalized = rels
            .iter()
            .find(|r| r.relation == RelationType::PenalizedBy)
            .unwrap();
        assert_eq!(penalized.source_text, "SEBI");
        assert_eq!(penalized.source_type, NodeType::Regulator);
        assert!(penalized.target_text.starts_with("Apex Commodities"));
    }

    #[test]
    fn test_received_penalty_amount() {
        let rels = extract("penalty of ₹50,00,000 imposed on Apex Commodities");
        let received = rels
            .iter()
            .find(|r| r.relation == RelationType::ReceivedPenalty)
            .unwrap();
        assert!(received.source_text.contains("50,00,000"));
        assert!(received.target_text.starts_with("Apex Commodities"));
    }

    #[test]
    fn test_similar_to_synthesizes_current_case() {
        let rels = extract("This matter is similar to case no. ADJ/123/2020.");
        let similar = rels
            .iter()
            .find(|r| r.relation == RelationType::SimilarTo)
            .unwrap();
        assert_eq!(similar.source_text, "current_case");
        assert_eq!(similar.target_text, "ADJ/123/2020");
        assert_eq!(similar.source_type, NodeType::Unknown);
    }

    #[test]
    fn test_no_match_yields_empty() {
        assert!(extract("Nothing of interest happened here.").is_empty());
    }

    #[test]
    fn test_infer_prefers_extracted_entity() {
        let entities = vec![RawEntity {
            text: "SEBI".to_string(),
            entity_type: NodeType::Entity,
            start: 0,
            end: 4,
            confidence: 0.8,
            context: String::new(),
        }];
        // Exact match against extracted entities wins over the regulator lexicon
        assert_eq!(
            infer_entity_type("SEBI", &entities, VIOLATION_VOCAB),
            NodeType::Entity
        );
        assert_eq!(
            infer_entity_type("SEBI", &[], VIOLATION_VOCAB),
            NodeType::Regulator
        );
    }

    #[test]
    fn test_infer_fallback_order() {
        assert_eq!(
            infer_entity_type("wash trading", &[], VIOLATION_VOCAB),
            NodeType::Violation
        );
        assert_eq!(
            infer_entity_type("Apex Commodities", &[], VIOLATION_VOCAB),
            NodeType::Entity
        );
        assert_eq!(
            infer_entity_type("something", &[], VIOLATION_VOCAB),
            NodeType::Unknown
        );
    }
}

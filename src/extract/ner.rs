//! Pluggable named-entity recognition.
//!
//! The extractor consumes any [`NamedEntityRecognizer`]; the built-in
//! [`LexiconNer`] is a regex/lexicon recognizer tuned for enforcement text.
//! Labels follow the usual NER conventions (ORG, PERSON, MONEY, DATE,
//! CARDINAL, GPE, LAW) so alternative backends can be dropped in.

use regex::Regex;

use crate::error::{ReggraphError, Result};

/// A typed span produced by a recognizer. Offsets are byte positions into
/// the input text.
#[derive(Debug, Clone)]
pub struct NerSpan {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
}

/// Named-entity recognition capability.
///
/// Implementations must be fully initialized on construction; a recognizer
/// that cannot load its model fails there, never at `recognize` time.
pub trait NamedEntityRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<NerSpan>>;
}

/// Rule-based recognizer for regulatory enforcement text.
///
/// Patterns are tried in priority order; a span overlapping an
/// already-claimed region is dropped, so each character belongs to at most
/// one span.
pub struct LexiconNer {
    patterns: Vec<(&'static str, Regex)>,
}

const MONTHS: &str = "January|February|March|April|May|June|July|August|September|October|November|December";

impl LexiconNer {
    pub fn new() -> Result<Self> {
        let specs: Vec<(&'static str, String)> = vec![
            (
                "ORG",
                r"\b(?:SEBI|RBI|IRDAI|PFRDA|Securities and Exchange Board of India|Reserve Bank of India)\b"
                    .to_string(),
            ),
            (
                "ORG",
                r"\b[A-Z][A-Za-z&]*(?:\s+[A-Z][A-Za-z&]*)*\s+(?:Ltd\.?|Limited|Corporation|Corp\.?|Inc\.?|Pvt\.?\s*Ltd\.?)"
                    .to_string(),
            ),
            (
                "PERSON",
                r"\b(?:Mr|Ms|Mrs|Dr|Shri|Smt)\.?\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*".to_string(),
            ),
            (
                "MONEY",
                r"(?:₹|Rs\.?\s?|INR\s?)\s*\d+(?:,\d+)*(?:\.\d+)?\s*(?:lakh|crore|Lakh|Crore)?"
                    .to_string(),
            ),
            (
                "DATE",
                format!(r"\b\d{{1,2}}(?:st|nd|rd|th)?\s+(?:{MONTHS})\s*,?\s+\d{{4}}\b"),
            ),
            (
                "DATE",
                format!(r"\b(?:{MONTHS})\s+\d{{1,2}}\s*,\s*\d{{4}}\b"),
            ),
            ("DATE", r"\b\d{1,2}[/.-]\d{1,2}[/.-]\d{2,4}\b".to_string()),
            (
                "LAW",
                r"\b(?:Section|Regulation|Rule)s?\s+\d+[A-Za-z]*(?:\(\d+\))?".to_string(),
            ),
            ("LAW", r"\b(?:SEBI|PIT|PFUTP)\s+(?:Act|Regulations),?\s*\d{4}\b".to_string()),
            ("CARDINAL", r"\b\d+(?:,\d+)*(?:\.\d+)?\b".to_string()),
        ];

        let mut patterns = Vec::with_capacity(specs.len());
        for (label, pattern) in specs {
            let regex = Regex::new(&pattern).map_err(|e| {
                ReggraphError::Ner(format!("failed to compile {label} pattern: {e}"))
            })?;
            patterns.push((label, regex));
        }

        Ok(Self { patterns })
    }
}

impl NamedEntityRecognizer for LexiconNer {
    fn recognize(&self, text: &str) -> Result<Vec<NerSpan>> {
        // (start, end) of spans already claimed by a higher-priority pattern
        let mut claimed: Vec<(usize, usize)> = Vec::new();
        let mut spans = Vec::new();

        for (label, regex) in &self.patterns {
            for m in regex.find_iter(text) {
                let overlaps = claimed
                    .iter()
                    .any(|&(s, e)| m.start() < e && s < m.end());
                if overlaps {
                    continue;
                }
                claimed.push((m.start(), m.end()));
                spans.push(NerSpan {
                    text: m.as_str().to_string(),
                    label: label.to_string(),
                    start: m.start(),
                    end: m.end(),
                });
            }
        }

        spans.sort_by_key(|s| s.start);
        Ok(spans)
    }
}

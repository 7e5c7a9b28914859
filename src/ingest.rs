//! Document input records and file loading.
//!
//! Document acquisition and format decoding are external collaborators;
//! this module only deserializes their output records (one per document
//! chunk) from JSON / JSONL files.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{ReggraphError, Result};

/// One pre-processed document chunk, as supplied by the acquisition
/// pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub document_id: String,
    #[serde(default)]
    pub chunk_index: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub document_type: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: String,
    /// Violation types already classified upstream.
    #[serde(default)]
    pub violation_types: Vec<String>,
    /// Entity names already classified upstream.
    #[serde(default)]
    pub entities: Vec<String>,
}

/// Load document chunks from a single `.json` (array or single object) or
/// `.jsonl` (one object per line) file.
pub fn load_documents(path: &Path) -> Result<Vec<DocumentChunk>> {
    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "jsonl" => {
            let mut docs = Vec::new();
            for (line_no, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let doc: DocumentChunk = serde_json::from_str(line).map_err(|e| {
                    ReggraphError::InvalidInput(format!(
                        "{}:{}: {}",
                        path.display(),
                        line_no + 1,
                        e
                    ))
                })?;
                docs.push(doc);
            }
            Ok(docs)
        }
        "json" => {
            let trimmed = content.trim_start();
            if trimmed.starts_with('[') {
                Ok(serde_json::from_str(&content)?)
            } else {
                Ok(vec![serde_json::from_str(&content)?])
            }
        }
        other => Err(ReggraphError::InvalidInput(format!(
            "Unsupported document file extension: {other} ({})",
            path.display()
        ))),
    }
}

/// Walk a directory collecting document chunks from every `.json`/`.jsonl`
/// file, in stable path order. An unreadable file is logged and skipped;
/// it does not abort discovery.
pub fn discover_documents(dir: &Path) -> Result<Vec<DocumentChunk>> {
    if !dir.is_dir() {
        return Err(ReggraphError::InvalidInput(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let mut docs = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file());

    for entry in walker {
        let path = entry.path();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if extension != "json" && extension != "jsonl" {
            continue;
        }
        match load_documents(path) {
            Ok(mut loaded) => {
                log::info!("Loaded {} documents from {}", loaded.len(), path.display());
                docs.append(&mut loaded);
            }
            Err(e) => {
                log::error!("Skipping {}: {}", path.display(), e);
            }
        }
    }

    Ok(docs)
}

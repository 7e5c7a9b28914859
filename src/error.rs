use thiserror::Error;

/// Main error type for reggraph
#[derive(Error, Debug)]
pub enum ReggraphError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot / export (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Extraction pattern failed to compile at construction time
    #[error("Invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Named-entity recognizer failure
    #[error("NER error: {0}")]
    Ner(String),

    /// Per-document extraction failure (recovered at the batch boundary)
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Edge insertion referenced a node that does not exist.
    /// The builder always resolves endpoints first, so this indicates a bug.
    #[error("Edge endpoint not found in graph: {0}")]
    MissingEndpoint(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using ReggraphError
pub type Result<T> = std::result::Result<T, ReggraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReggraphError::Config("Test error".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("Test error"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ReggraphError = io_err.into();
        assert!(matches!(err, ReggraphError::Io(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ReggraphError = json_err.into();
        assert!(matches!(err, ReggraphError::Serialization(_)));
    }

    #[test]
    fn test_missing_endpoint_display() {
        let err = ReggraphError::MissingEndpoint("Entity_ghost".to_string());
        assert!(err.to_string().contains("Entity_ghost"));
    }
}

//! Error types for the Markdown tree indexer.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, TreeIndexError>;

/// Errors that can occur while building a document tree.
#[derive(Error, Debug)]
pub enum TreeIndexError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The document path does not exist.
    #[error("Document not found at '{0}'")]
    DocumentNotFound(PathBuf),

    /// Configuration file or value error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Summaries or a description were requested but no generator was supplied.
    #[error("A text generator is required to {0}")]
    MissingGenerator(&'static str),

    /// LLM API error.
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// LLM response parsing error.
    #[error("Failed to parse LLM response: {0}")]
    LlmParse(String),

    /// HTTP request error.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// An injected generator failed while producing text.
    #[error("Text generation failed: {0}")]
    Generation(String),
}

impl TreeIndexError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for TreeIndexError {
    fn from(err: reqwest::Error) -> Self {
        TreeIndexError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for TreeIndexError {
    fn from(err: serde_json::Error) -> Self {
        TreeIndexError::LlmParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_generator_message() {
        let err = TreeIndexError::MissingGenerator("add node summaries");
        assert_eq!(
            err.to_string(),
            "A text generator is required to add node summaries"
        );
    }

    #[test]
    fn test_io_error_carries_path() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = TreeIndexError::io("/tmp/doc.md", source);
        assert!(err.to_string().contains("/tmp/doc.md"));
    }
}

//! Document representation for the Markdown tree indexer.
//!
//! A document is plain Markdown text plus a name. Paged sources are
//! flattened into a single text before indexing.

use crate::error::{Result, TreeIndexError};
use crate::thinning::estimate_tokens;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A Markdown document ready to be indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document name, used as `doc_name` in the emitted tree.
    pub name: String,
    /// Original file path (if loaded from file).
    pub path: Option<PathBuf>,
    /// Raw Markdown content.
    pub content: String,
}

impl Document {
    /// Create a document from raw Markdown content.
    pub fn from_markdown(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            content: content.into(),
        }
    }

    /// Create a document from a list of page texts.
    ///
    /// Pages are joined with a blank line; empty pages are skipped.
    pub fn from_pages(name: impl Into<String>, pages: Vec<String>) -> Self {
        let content = pages
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        Self::from_markdown(name, content)
    }

    /// Load a Markdown file, naming the document after the file stem.
    pub async fn from_markdown_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TreeIndexError::DocumentNotFound(path.to_path_buf())
            } else {
                TreeIndexError::io(path, e)
            }
        })?;

        Ok(Self {
            name: document_name(path),
            path: Some(path.to_path_buf()),
            content,
        })
    }

    /// The document's line stream.
    pub fn lines(&self) -> Vec<&str> {
        self.content.split('\n').collect()
    }

    /// Number of lines in the document.
    pub fn line_count(&self) -> usize {
        self.content.split('\n').count()
    }

    /// Estimated token count of the whole document.
    pub fn total_tokens(&self) -> usize {
        estimate_tokens(&self.content)
    }
}

/// Derive a document name from a path: the base name without extension.
pub fn document_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_document_from_markdown() {
        let doc = Document::from_markdown("Guide", "# Title\nbody");
        assert_eq!(doc.name, "Guide");
        assert!(doc.path.is_none());
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.lines(), vec!["# Title", "body"]);
    }

    #[test]
    fn test_document_from_pages_skips_blank_pages() {
        let doc = Document::from_pages(
            "paged",
            vec!["# One\na".to_string(), "   ".to_string(), "# Two\nb".to_string()],
        );
        assert_eq!(doc.content, "# One\na\n\n# Two\nb");
    }

    #[test]
    fn test_total_tokens() {
        let doc = Document::from_markdown("d", "abcdefgh");
        assert_eq!(doc.total_tokens(), 2);
    }

    #[test]
    fn test_document_name_strips_extension() {
        assert_eq!(document_name(Path::new("/docs/user-guide.md")), "user-guide");
        assert_eq!(document_name(Path::new("notes")), "notes");
    }

    #[tokio::test]
    async fn test_from_markdown_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manual.md");
        std::fs::write(&path, "# Manual\nRead me.").unwrap();

        let doc = Document::from_markdown_file(&path).await.unwrap();
        assert_eq!(doc.name, "manual");
        assert_eq!(doc.path.as_deref(), Some(path.as_path()));
        assert!(doc.content.starts_with("# Manual"));
    }

    #[tokio::test]
    async fn test_from_missing_file() {
        let result = Document::from_markdown_file(Path::new("/nonexistent/doc.md")).await;
        assert!(matches!(result, Err(TreeIndexError::DocumentNotFound(_))));
    }
}

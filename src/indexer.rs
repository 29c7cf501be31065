//! Tree indexer - turns a Markdown document into a summarized section tree.
//!
//! The pipeline is strictly linear:
//! 1. Scan headings and materialize the text each one owns
//! 2. Optionally account tokens and thin small subtrees
//! 3. Nest sections by heading level
//! 4. Assign node identifiers
//! 5. Optionally summarize every node and describe the document

use crate::config::IndexConfig;
use crate::document::Document;
use crate::error::{Result, TreeIndexError};
use crate::llm::TextGenerator;
use crate::markdown::extract_sections;
use crate::summarizer::{DEFAULT_SUMMARY_TOKEN_THRESHOLD, Summarizer};
use crate::thinning::{annotate_token_counts, thin_sections};
use crate::tree::{DocumentTree, assign_node_ids, build_tree, strip_text};
use std::path::Path;
use std::sync::Arc;

/// Default token count below which a subtree is collapsed when thinning.
pub const DEFAULT_THINNING_THRESHOLD: usize = 5000;

/// Options for tree index generation.
#[derive(Debug, Clone)]
pub struct IndexerOptions {
    /// Collapse subtrees smaller than `thinning_threshold`.
    pub if_thinning: bool,
    /// Token threshold used when thinning.
    pub thinning_threshold: usize,
    /// Texts shorter than this are used verbatim as summaries.
    pub summary_token_threshold: usize,
    /// Attach `summary` / `prefix_summary` to every node.
    pub if_add_node_summary: bool,
    /// Generate a one-sentence document description.
    pub if_add_doc_description: bool,
    /// Keep each node's owned text in the output.
    pub if_add_node_text: bool,
    /// Assign zero-padded node identifiers.
    pub if_add_node_id: bool,
}

impl Default for IndexerOptions {
    fn default() -> Self {
        Self {
            if_thinning: false,
            thinning_threshold: DEFAULT_THINNING_THRESHOLD,
            summary_token_threshold: DEFAULT_SUMMARY_TOKEN_THRESHOLD,
            if_add_node_summary: true,
            if_add_doc_description: false,
            if_add_node_text: false,
            if_add_node_id: true,
        }
    }
}

impl From<&IndexConfig> for IndexerOptions {
    fn from(config: &IndexConfig) -> Self {
        Self {
            if_thinning: config.thinning,
            thinning_threshold: config.thinning_threshold,
            summary_token_threshold: config.summary_token_threshold,
            if_add_node_summary: config.node_summary,
            if_add_doc_description: config.doc_description,
            if_add_node_text: config.node_text,
            if_add_node_id: config.node_id,
        }
    }
}

/// Builds document trees from Markdown.
pub struct MarkdownIndexer {
    generator: Option<Arc<dyn TextGenerator>>,
    options: IndexerOptions,
}

impl MarkdownIndexer {
    /// Create an indexer without a text generator.
    pub fn new(options: IndexerOptions) -> Self {
        Self {
            generator: None,
            options,
        }
    }

    /// Attach the generator used for summaries and descriptions.
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// The options this indexer runs with.
    pub fn options(&self) -> &IndexerOptions {
        &self.options
    }

    /// Check that every enabled option has what it needs.
    fn summarizer(&self) -> Result<Option<Summarizer>> {
        let opts = &self.options;
        if !opts.if_add_node_summary && !opts.if_add_doc_description {
            return Ok(None);
        }

        let generator = self.generator.clone().ok_or(if opts.if_add_node_summary {
            TreeIndexError::MissingGenerator("add node summaries")
        } else {
            TreeIndexError::MissingGenerator("add a document description")
        })?;

        Ok(Some(Summarizer::new(generator, opts.summary_token_threshold)))
    }

    /// Build a tree index for a document.
    pub async fn index(&self, document: &Document) -> Result<DocumentTree> {
        let summarizer = self.summarizer()?;
        let opts = &self.options;

        let mut sections = extract_sections(&document.content);
        tracing::info!(
            document = %document.name,
            sections = sections.len(),
            "extracted markdown sections"
        );

        if opts.if_thinning {
            annotate_token_counts(&mut sections);
            let before = sections.len();
            sections = thin_sections(sections, opts.thinning_threshold);
            tracing::info!(
                before,
                after = sections.len(),
                threshold = opts.thinning_threshold,
                "thinned sections"
            );
        }

        let mut nodes = build_tree(sections);

        if opts.if_add_node_id {
            assign_node_ids(&mut nodes);
        }

        let mut description = None;
        if let Some(summarizer) = summarizer {
            if opts.if_add_node_summary {
                summarizer.summarize_tree(&mut nodes).await?;
            }
            if !opts.if_add_node_text {
                strip_text(&mut nodes);
            }
            if opts.if_add_doc_description {
                description = Some(summarizer.describe_document(&nodes).await?);
            }
        } else if !opts.if_add_node_text {
            strip_text(&mut nodes);
        }

        let mut tree = DocumentTree::new(&document.name, nodes);
        tree.description = description;

        tracing::info!(
            document = %tree.name,
            nodes = tree.node_count(),
            depth = tree.max_depth(),
            "built document tree"
        );

        Ok(tree)
    }

    /// Read a Markdown file and index it, naming the tree after the file stem.
    pub async fn index_file(&self, path: &Path) -> Result<DocumentTree> {
        self.summarizer()?;
        let document = Document::from_markdown_file(path).await?;
        self.index(&document).await
    }
}

/// Convenience function to index Markdown content in one call.
pub async fn index_markdown(
    content: &str,
    name: &str,
    options: IndexerOptions,
    generator: Option<Arc<dyn TextGenerator>>,
) -> Result<DocumentTree> {
    let mut indexer = MarkdownIndexer::new(options);
    indexer.generator = generator;
    indexer.index(&Document::from_markdown(name, content)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FnGenerator;
    use crate::tree::preorder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn structure_only() -> IndexerOptions {
        IndexerOptions {
            if_add_node_summary: false,
            ..Default::default()
        }
    }

    fn echo_generator(calls: Arc<AtomicUsize>) -> Arc<dyn TextGenerator> {
        Arc::new(FnGenerator(move |_prompt: String| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TreeIndexError>("A short manual.".to_string())
            }
        }))
    }

    #[test]
    fn test_indexer_options_default() {
        let options = IndexerOptions::default();
        assert!(!options.if_thinning);
        assert_eq!(options.thinning_threshold, 5000);
        assert_eq!(options.summary_token_threshold, 200);
        assert!(options.if_add_node_summary);
        assert!(!options.if_add_doc_description);
        assert!(!options.if_add_node_text);
        assert!(options.if_add_node_id);
    }

    #[test]
    fn test_options_from_config() {
        let config = IndexConfig {
            thinning: true,
            thinning_threshold: 42,
            ..Default::default()
        };
        let options = IndexerOptions::from(&config);
        assert!(options.if_thinning);
        assert_eq!(options.thinning_threshold, 42);
    }

    #[tokio::test]
    async fn test_missing_generator_fails_fast() {
        let indexer = MarkdownIndexer::new(IndexerOptions::default());
        let result = indexer.index(&Document::from_markdown("d", "# A")).await;
        assert!(matches!(result, Err(TreeIndexError::MissingGenerator(_))));

        let result = indexer.index_file(Path::new("/nonexistent/file.md")).await;
        assert!(matches!(result, Err(TreeIndexError::MissingGenerator(_))));
    }

    #[tokio::test]
    async fn test_description_alone_requires_generator() {
        let options = IndexerOptions {
            if_add_node_summary: false,
            if_add_doc_description: true,
            ..Default::default()
        };
        let result = index_markdown("# A", "d", options, None).await;
        assert!(matches!(result, Err(TreeIndexError::MissingGenerator(_))));
    }

    #[tokio::test]
    async fn test_structure_only_conversion() {
        let tree = index_markdown(
            "# A\ntext1\n## B\ntext2\n## C\ntext3",
            "doc",
            structure_only(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(tree.name, "doc");
        assert!(tree.description.is_none());
        assert_eq!(tree.nodes.len(), 1);
        let a = &tree.nodes[0];
        assert_eq!(a.title, "A");
        assert_eq!(a.node_id.as_deref(), Some("0000"));
        assert!(a.text.is_none());
        assert!(a.summary.is_none() && a.prefix_summary.is_none());
        let children: Vec<_> = a.nodes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(children, vec!["B", "C"]);
    }

    #[tokio::test]
    async fn test_text_kept_when_requested() {
        let options = IndexerOptions {
            if_add_node_text: true,
            if_add_node_id: false,
            ..structure_only()
        };
        let tree = index_markdown("# A\ntext1\n## B\ntext2", "doc", options, None)
            .await
            .unwrap();

        assert_eq!(tree.nodes[0].text.as_deref(), Some("# A\ntext1"));
        assert!(preorder(&tree.nodes).iter().all(|n| n.node_id.is_none()));
    }

    #[tokio::test]
    async fn test_no_headings_yields_empty_structure() {
        let tree = index_markdown("plain prose only", "doc", structure_only(), None)
            .await
            .unwrap();
        assert!(tree.nodes.is_empty());
        assert!(tree.to_json().unwrap().contains("\"structure\": []"));
    }

    #[tokio::test]
    async fn test_thinning_collapses_small_tree() {
        let options = IndexerOptions {
            if_thinning: true,
            if_add_node_text: true,
            ..structure_only()
        };
        let tree = index_markdown("# A\ntext1\n## B\ntext2\n## C\ntext3", "doc", options, None)
            .await
            .unwrap();

        assert_eq!(tree.node_count(), 1);
        assert_eq!(
            tree.nodes[0].text.as_deref(),
            Some("# A\ntext1\n\n## B\ntext2\n\n## C\ntext3")
        );
    }

    #[tokio::test]
    async fn test_full_pipeline_with_generator() {
        let calls = Arc::new(AtomicUsize::new(0));
        let options = IndexerOptions {
            if_add_doc_description: true,
            ..Default::default()
        };
        let indexer = MarkdownIndexer::new(options).with_generator(echo_generator(calls.clone()));
        let doc = Document::from_markdown("manual", "# Intro\nHello.\n## Usage\nRun it.");

        let tree = indexer.index(&doc).await.unwrap();

        // short texts are their own summaries; only the description calls out
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(tree.description.as_deref(), Some("A short manual."));
        let intro = &tree.nodes[0];
        assert_eq!(intro.prefix_summary.as_deref(), Some("# Intro\nHello."));
        assert_eq!(intro.nodes[0].summary.as_deref(), Some("## Usage\nRun it."));
        assert!(intro.text.is_none());

        let json = tree.to_json().unwrap();
        let parsed = DocumentTree::from_json(&json).unwrap();
        assert_eq!(parsed, tree);
    }

    #[tokio::test]
    async fn test_index_file_names_document_after_stem() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("release-notes.md");
        std::fs::write(&path, "# v1\nFirst release.").unwrap();

        let indexer = MarkdownIndexer::new(structure_only());
        let tree = indexer.index_file(&path).await.unwrap();
        assert_eq!(tree.name, "release-notes");
        assert_eq!(tree.nodes[0].start_index, Some(1));
    }
}

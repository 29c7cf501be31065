//! Markdown Tree Indexer - hierarchical, summarized section trees for LLM navigation.
//!
//! A large Markdown document is turned into a tree of sections, each with an
//! optional machine-generated summary, so a language model can walk the
//! structure instead of reading the whole document.
//!
//! # Overview
//!
//! 1. Headings are scanned line by line (skipping fenced code blocks)
//! 2. Each heading owns the text up to the next heading
//! 3. Optionally, subtrees too small to stand alone are thinned into their parent
//! 4. Sections are nested by heading level
//! 5. Optionally, every node is summarized through an injected text generator
//!
//! # Quick Start
//!
//! ```no_run
//! use md_tree_indexer::{
//!     config::Config,
//!     indexer::{IndexerOptions, MarkdownIndexer},
//!     llm::LlmClient,
//! };
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     let client = LlmClient::new(config.llm.clone());
//!     let indexer = MarkdownIndexer::new(IndexerOptions::from(&config.index))
//!         .with_generator(Arc::new(client));
//!
//!     let tree = indexer.index_file(Path::new("README.md")).await?;
//!     println!("{}", tree.to_json()?);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **markdown**: heading scanner and section materializer
//! - **thinning**: token accounting and subtree collapsing
//! - **tree**: tree model, builder and traversals
//! - **summarizer**: concurrent node summaries and document description
//! - **llm**: the `TextGenerator` seam and an OpenAI-compatible client
//! - **indexer**: the conversion entry points

pub mod config;
pub mod document;
pub mod error;
pub mod indexer;
pub mod json;
pub mod llm;
pub mod markdown;
pub mod summarizer;
pub mod thinning;
pub mod tree;

// Re-export commonly used types
pub use config::Config;
pub use document::Document;
pub use error::{Result, TreeIndexError};
pub use indexer::{IndexerOptions, MarkdownIndexer, index_markdown};
pub use json::extract_json;
pub use llm::{FnGenerator, LlmClient, TextGenerator};
pub use markdown::FlatSection;
pub use summarizer::Summarizer;
pub use thinning::estimate_tokens;
pub use tree::{DocumentTree, TreeNode};

//! Node summaries and document descriptions.
//!
//! Every node in a tree is summarized concurrently. Short texts are used
//! as their own summary; longer ones go to the [`TextGenerator`]. Results are
//! written back only once every request has finished, and only if all of
//! them succeeded.

use crate::error::{Result, TreeIndexError};
use crate::llm::{Prompts, TextGenerator};
use crate::thinning::estimate_tokens;
use crate::tree::{TreeNode, description_projection, for_each_preorder_mut, preorder};
use futures::future::join_all;
use std::sync::Arc;

/// Default token count below which a node's text is its own summary.
pub const DEFAULT_SUMMARY_TOKEN_THRESHOLD: usize = 200;

/// Summarizes tree nodes through an injected generator.
#[derive(Clone)]
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
    summary_token_threshold: usize,
}

impl Summarizer {
    /// Create a summarizer.
    pub fn new(generator: Arc<dyn TextGenerator>, summary_token_threshold: usize) -> Self {
        Self {
            generator,
            summary_token_threshold,
        }
    }

    /// Summary for a single text: the text itself when short, otherwise a model call.
    pub async fn summarize_text(&self, text: &str) -> Result<String> {
        if estimate_tokens(text) < self.summary_token_threshold {
            return Ok(text.to_string());
        }
        self.generator
            .generate(&Prompts::render_node_summary(text))
            .await
    }

    /// Attach a summary to every node.
    ///
    /// Leaves receive `summary`, nodes with children receive `prefix_summary`.
    /// Leaf status is read before any request is issued.
    pub async fn summarize_tree(&self, nodes: &mut [TreeNode]) -> Result<()> {
        let texts: Vec<String> = preorder(nodes)
            .into_iter()
            .map(|node| node.text.clone().unwrap_or_default())
            .collect();

        let model_calls = texts
            .iter()
            .filter(|t| estimate_tokens(t) >= self.summary_token_threshold)
            .count();
        tracing::info!(nodes = texts.len(), model_calls, "summarizing tree nodes");

        let results = join_all(texts.iter().map(|text| self.summarize_text(text))).await;
        let summaries = results.into_iter().collect::<Result<Vec<String>>>()?;

        let mut summaries = summaries.into_iter();
        for_each_preorder_mut(nodes, &mut |node: &mut TreeNode| {
            let Some(summary) = summaries.next() else {
                return;
            };
            if node.has_children() {
                node.prefix_summary = Some(summary);
            } else {
                node.summary = Some(summary);
            }
        });

        Ok(())
    }

    /// One-sentence description of a whole document from its summarized tree.
    pub async fn describe_document(&self, nodes: &[TreeNode]) -> Result<String> {
        let structure = serde_json::to_string(&description_projection(nodes))
            .map_err(|e| TreeIndexError::Serialization(e.to_string()))?;

        let description = self
            .generator
            .generate(&Prompts::render_doc_description(&structure))
            .await?;

        Ok(description.trim().to_string())
    }
}

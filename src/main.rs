//! Markdown Tree Indexer CLI
//!
//! Builds a hierarchical, summarized section tree from a Markdown file.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use md_tree_indexer::{
    config::Config,
    document::Document,
    indexer::{IndexerOptions, MarkdownIndexer},
    llm::LlmClient,
    tree::DocumentTree,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Markdown Tree Indexer - hierarchical section trees for LLM navigation
#[derive(Parser)]
#[command(name = "md-indexer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a section tree for a Markdown file
    Index {
        /// Path to the Markdown file
        document: PathBuf,

        /// Write the tree JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        flags: IndexFlags,
    },

    /// Display the tree structure of a saved tree JSON file
    Show {
        /// Path to the tree JSON file
        tree: PathBuf,

        /// Output as JSON instead of formatted tree
        #[arg(long)]
        json: bool,
    },

    /// Test LLM connection
    Test,
}

/// Per-run overrides of the configured index options.
#[derive(Args)]
struct IndexFlags {
    /// Collapse subtrees smaller than the thinning threshold
    #[arg(long)]
    thinning: bool,

    /// Token threshold for thinning
    #[arg(long)]
    thinning_threshold: Option<usize>,

    /// Texts below this token estimate are used verbatim as summaries
    #[arg(long)]
    summary_threshold: Option<usize>,

    /// Skip per-node summaries (no LLM needed)
    #[arg(long)]
    no_summary: bool,

    /// Generate a one-sentence document description
    #[arg(long)]
    description: bool,

    /// Keep each node's text in the output
    #[arg(long)]
    with_text: bool,

    /// Do not assign node identifiers
    #[arg(long)]
    no_node_id: bool,
}

impl IndexFlags {
    fn apply(&self, config: &mut Config) {
        let index = &mut config.index;
        index.thinning |= self.thinning;
        if let Some(threshold) = self.thinning_threshold {
            index.thinning_threshold = threshold;
        }
        if let Some(threshold) = self.summary_threshold {
            index.summary_token_threshold = threshold;
        }
        if self.no_summary {
            index.node_summary = false;
        }
        index.doc_description |= self.description;
        index.node_text |= self.with_text;
        if self.no_node_id {
            index.node_id = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "md_tree_indexer=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Index {
            document,
            output,
            flags,
        } => cmd_index(document, output, flags).await,
        Commands::Show { tree, json } => cmd_show(tree, json),
        Commands::Test => cmd_test().await,
    }
}

async fn cmd_index(
    document_path: PathBuf,
    output: Option<PathBuf>,
    flags: IndexFlags,
) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    flags.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let start = Instant::now();

    let document = Document::from_markdown_file(&document_path)
        .await
        .context("Failed to load document")?;

    tracing::info!(
        document = %document.name,
        lines = document.line_count(),
        tokens = document.total_tokens(),
        "loaded document"
    );

    let mut indexer = MarkdownIndexer::new(IndexerOptions::from(&config.index));
    if config.index.needs_generator() {
        tracing::info!(model = %config.llm.model, "using LLM for summaries");
        indexer = indexer.with_generator(Arc::new(LlmClient::new(config.llm.clone())));
    }

    let tree = indexer
        .index(&document)
        .await
        .context("Failed to build document tree")?;

    tracing::info!(
        sections = tree.node_count(),
        depth = tree.max_depth(),
        elapsed = ?start.elapsed(),
        "tree built"
    );

    let json = tree.to_json().context("Failed to serialize tree")?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "tree written");
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn cmd_show(tree_path: PathBuf, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(&tree_path)
        .with_context(|| format!("Failed to read {}", tree_path.display()))?;
    let tree = DocumentTree::from_json(&content).context("Failed to parse tree JSON")?;

    if json {
        println!("{}", tree.to_json().context("Failed to serialize tree")?);
    } else {
        println!("{}", tree.format());
    }

    Ok(())
}

async fn cmd_test() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    println!("Configuration:");
    println!("  API Base:  {}", config.llm.api_base);
    println!("  Model:     {}", config.llm.model);
    println!(
        "  API Key:   {}...",
        config.llm.api_key.chars().take(8).collect::<String>()
    );
    println!();

    if let Err(e) = config.validate_llm() {
        println!("Configuration error: {}", e);
        return Ok(());
    }

    let client = LlmClient::new(config.llm);

    println!("Sending test request...");
    match client.test_connection().await {
        Ok(()) => println!("Connection successful!"),
        Err(e) => println!("Connection failed: {}", e),
    }

    Ok(())
}

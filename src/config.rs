//! Configuration for the Markdown tree indexer.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{Result, TreeIndexError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL for the LLM API (e.g., "https://api.openai.com")
    pub api_base: String,

    /// API key for authentication
    pub api_key: String,

    /// Model name (e.g., "gpt-4o")
    pub model: String,

    /// Maximum tokens for response (optional)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for generation (optional)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.0
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            api_key: String::new(),
            model: "gpt-4o-2024-11-20".to_string(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Defaults for tree construction, overridable per run from the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Collapse small subtrees into their parent.
    pub thinning: bool,
    /// Subtrees with fewer estimated tokens than this are collapsed.
    pub thinning_threshold: usize,
    /// Node text below this many estimated tokens is used verbatim as its summary.
    pub summary_token_threshold: usize,
    /// Request per-node summaries.
    pub node_summary: bool,
    /// Request a one-sentence document description.
    pub doc_description: bool,
    /// Keep each node's owned text in the output.
    pub node_text: bool,
    /// Assign zero-padded node identifiers.
    pub node_id: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            thinning: false,
            thinning_threshold: 5000,
            summary_token_threshold: 200,
            node_summary: true,
            doc_description: false,
            node_text: false,
            node_id: true,
        }
    }
}

impl IndexConfig {
    /// Whether any enabled option needs a text generator.
    pub fn needs_generator(&self) -> bool {
        self.node_summary || self.doc_description
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM settings
    pub llm: LlmConfig,

    /// Tree construction settings
    #[serde(default)]
    pub index: IndexConfig,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    llm: Option<LlmFileSection>,
    index: Option<IndexFileSection>,
}

#[derive(Debug, Deserialize)]
struct LlmFileSection {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct IndexFileSection {
    thinning: Option<bool>,
    thinning_threshold: Option<usize>,
    summary_token_threshold: Option<usize>,
    node_summary: Option<bool>,
    doc_description: Option<bool>,
    node_text: Option<bool>,
    node_id: Option<bool>,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (LLM_API_BASE, LLM_API_KEY, LLM_MODEL, MD_INDEX_*)
    /// 2. Config file (~/.config/md-tree-indexer/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(api_base) = env::var("LLM_API_BASE") {
            self.llm.api_base = api_base;
        }

        if let Ok(api_key) = env::var("LLM_API_KEY") {
            self.llm.api_key = api_key;
        }

        if let Ok(model) = env::var("LLM_MODEL") {
            self.llm.model = model;
        }

        if let Some(tokens) = parse_env("LLM_MAX_TOKENS") {
            self.llm.max_tokens = tokens;
        }

        if let Some(temp) = parse_env("LLM_TEMPERATURE") {
            self.llm.temperature = temp;
        }

        if let Some(thinning) = parse_env("MD_INDEX_THINNING") {
            self.index.thinning = thinning;
        }

        if let Some(threshold) = parse_env("MD_INDEX_THINNING_THRESHOLD") {
            self.index.thinning_threshold = threshold;
        }

        if let Some(threshold) = parse_env("MD_INDEX_SUMMARY_THRESHOLD") {
            self.index.summary_token_threshold = threshold;
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TreeIndexError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file_config: ConfigFile = serde_yaml::from_str(content)
            .map_err(|e| TreeIndexError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut config = Config::default();

        if let Some(llm) = file_config.llm {
            if let Some(api_base) = llm.api_base {
                config.llm.api_base = api_base;
            }
            if let Some(api_key) = llm.api_key {
                config.llm.api_key = api_key;
            }
            if let Some(model) = llm.model {
                config.llm.model = model;
            }
            if let Some(max_tokens) = llm.max_tokens {
                config.llm.max_tokens = max_tokens;
            }
            if let Some(temperature) = llm.temperature {
                config.llm.temperature = temperature;
            }
        }

        if let Some(index) = file_config.index {
            let target = &mut config.index;
            target.thinning = index.thinning.unwrap_or(target.thinning);
            target.thinning_threshold = index
                .thinning_threshold
                .unwrap_or(target.thinning_threshold);
            target.summary_token_threshold = index
                .summary_token_threshold
                .unwrap_or(target.summary_token_threshold);
            target.node_summary = index.node_summary.unwrap_or(target.node_summary);
            target.doc_description = index.doc_description.unwrap_or(target.doc_description);
            target.node_text = index.node_text.unwrap_or(target.node_text);
            target.node_id = index.node_id.unwrap_or(target.node_id);
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "md-tree-indexer")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that required configuration is present.
    ///
    /// LLM settings are only required when the index options call for a model.
    pub fn validate(&self) -> Result<()> {
        if self.index.needs_generator() {
            self.validate_llm()?;
        }
        Ok(())
    }

    /// Validate the LLM section regardless of index options.
    pub fn validate_llm(&self) -> Result<()> {
        if self.llm.api_base.is_empty() {
            return Err(TreeIndexError::Config(
                "LLM API base URL is required. Set LLM_API_BASE environment variable or add to config file.".to_string()
            ));
        }

        if self.llm.api_key.is_empty() {
            return Err(TreeIndexError::Config(
                "LLM API key is required. Set LLM_API_KEY environment variable or add to config file.".to_string()
            ));
        }

        if self.llm.model.is_empty() {
            return Err(TreeIndexError::Config(
                "LLM model is required. Set LLM_MODEL environment variable or add to config file."
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Create a config from explicit values (useful for testing).
    pub fn with_llm(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            llm: LlmConfig {
                api_base: api_base.into(),
                api_key: api_key.into(),
                model: model.into(),
                ..Default::default()
            },
            index: IndexConfig::default(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.llm.api_base.is_empty());
        assert!(config.llm.api_key.is_empty());
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.llm.temperature, 0.0);
        assert!(!config.index.thinning);
        assert_eq!(config.index.thinning_threshold, 5000);
        assert_eq!(config.index.summary_token_threshold, 200);
        assert!(config.index.node_summary);
        assert!(config.index.node_id);
    }

    #[test]
    fn test_validate_fails_without_llm_when_summaries_enabled() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_passes_without_llm_when_no_model_needed() {
        let mut config = Config::default();
        config.index.node_summary = false;
        config.index.doc_description = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_llm() {
        let config = Config::with_llm("https://api.example.com", "test-key", "gpt-4");
        assert_eq!(config.llm.api_base, "https://api.example.com");
        assert_eq!(config.llm.api_key, "test-key");
        assert_eq!(config.llm.model, "gpt-4");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_yaml_partial_sections() {
        let yaml = r#"
llm:
  api_base: "https://llm.internal"
  api_key: "k"
index:
  thinning: true
  thinning_threshold: 1200
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.llm.api_base, "https://llm.internal");
        assert!(config.index.thinning);
        assert_eq!(config.index.thinning_threshold, 1200);
        // untouched fields keep their defaults
        assert_eq!(config.index.summary_token_threshold, 200);
        assert!(config.index.node_id);
    }

    #[test]
    fn test_from_yaml_rejects_garbage() {
        let result = Config::from_yaml("llm: [not, a, map");
        assert!(matches!(result, Err(TreeIndexError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "index:\n  node_text: true\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert!(config.index.node_text);
    }
}

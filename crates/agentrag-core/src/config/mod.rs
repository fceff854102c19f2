//! Configuration management

use crate::error::{AgentRagError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM service configuration
    #[serde(default)]
    pub llm_service: LLMServiceConfig,

    /// Decision graph tuning
    #[serde(default)]
    pub agent: AgentConfig,

    /// External search tools
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Corpus ingestion
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the LLM service for chat/completions
    #[serde(default = "default_llm_url")]
    pub url: String,

    /// Model name for chat completions (grading, synthesis)
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Base URL for embeddings service (can be different from LLM URL)
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding dimensions (will be auto-detected if not specified)
    #[serde(default)]
    pub embedding_dimensions: Option<usize>,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl LLMServiceConfig {
    /// Get the embeddings URL (falls back to main URL if not specified)
    pub fn embeddings_url(&self) -> &str {
        self.embedding_url.as_deref().unwrap_or(&self.url)
    }

    /// Hosted endpoints refuse anonymous requests
    fn requires_api_key(&self) -> bool {
        HOSTED_ENDPOINTS.iter().any(|host| self.url.contains(host))
    }

    /// Embeddings would go to an endpoint that cannot produce them
    fn lacks_embeddings(&self) -> bool {
        self.embedding_url.is_none()
            && CHAT_ONLY_ENDPOINTS.iter().any(|host| self.url.contains(host))
    }
}

const HOSTED_ENDPOINTS: &[&str] = &["api.groq.com", "api.openai.com", "api.together.xyz"];

/// Hosted chat endpoints without a `/v1/embeddings` route
const CHAT_ONLY_ENDPOINTS: &[&str] = &["api.groq.com"];

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: default_llm_url(),
            model: default_chat_model(),
            embedding_url: std::env::var("AGENTRAG_EMBEDDING_URL").ok(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: std::env::var("AGENTRAG_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok()),
            api_key: env_llm_api_key(),
            timeout_secs: default_timeout(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_llm_url() -> String {
    std::env::var("AGENTRAG_LLM_URL").unwrap_or_else(|_| "https://api.groq.com/openai".to_string())
}

fn env_llm_api_key() -> Option<String> {
    std::env::var("AGENTRAG_LLM_API_KEY")
        .or_else(|_| std::env::var("GROQ_API_KEY"))
        .ok()
}

fn default_chat_model() -> String {
    std::env::var("AGENTRAG_LLM_MODEL").unwrap_or_else(|_| "llama-3.1-8b-instant".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("AGENTRAG_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "sentence-transformers/all-MiniLM-L6-v2".to_string())
}

fn default_timeout() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    768
}

/// Tuning knobs for the retrieval / grading / escalation graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Escalation cycles allowed per query
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fragments requested from the vector index
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Similarity floor below which local hits are discarded
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,

    /// Similarity above which a fragment counts as relevant without a grader label
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f64,

    /// Conversation turns included in the synthesis prompt
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Concurrent grading calls
    #[serde(default = "default_grader_concurrency")]
    pub grader_concurrency: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            top_k: default_top_k(),
            min_similarity: default_min_similarity(),
            relevance_threshold: default_relevance_threshold(),
            history_window: default_history_window(),
            grader_concurrency: default_grader_concurrency(),
        }
    }
}

fn default_max_attempts() -> u32 {
    std::env::var("AGENTRAG_MAX_ATTEMPTS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(crate::agent::DEFAULT_MAX_ATTEMPTS)
}

fn default_top_k() -> usize {
    4
}

fn default_min_similarity() -> f64 {
    0.2
}

fn default_relevance_threshold() -> f64 {
    0.75
}

fn default_history_window() -> usize {
    6
}

fn default_grader_concurrency() -> usize {
    4
}

/// External search tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Tavily key; general web search is disabled without it
    #[serde(default)]
    pub tavily_api_key: Option<String>,

    #[serde(default = "default_tavily_max_results")]
    pub tavily_max_results: usize,

    /// Wikipedia language edition
    #[serde(default = "default_wikipedia_lang")]
    pub wikipedia_lang: String,

    #[serde(default = "default_wikipedia_top_k")]
    pub wikipedia_top_k: usize,

    #[serde(default = "default_arxiv_top_k")]
    pub arxiv_top_k: usize,

    /// Abstracts longer than this are truncated
    #[serde(default = "default_arxiv_max_chars")]
    pub arxiv_max_chars: usize,

    /// Per-call timeout for a single tool
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            tavily_api_key: std::env::var("TAVILY_API_KEY").ok(),
            tavily_max_results: default_tavily_max_results(),
            wikipedia_lang: default_wikipedia_lang(),
            wikipedia_top_k: default_wikipedia_top_k(),
            arxiv_top_k: default_arxiv_top_k(),
            arxiv_max_chars: default_arxiv_max_chars(),
            timeout_secs: default_tool_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_tavily_max_results() -> usize {
    5
}

fn default_wikipedia_lang() -> String {
    "en".to_string()
}

fn default_wikipedia_top_k() -> usize {
    3
}

fn default_arxiv_top_k() -> usize {
    2
}

fn default_arxiv_max_chars() -> usize {
    1000
}

fn default_tool_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    concat!("agentrag/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Corpus ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Chunk window in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Sources used when none are given on the command line
    #[serde(default = "default_urls")]
    pub default_urls: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            default_urls: default_urls(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_urls() -> Vec<String> {
    vec![
        "https://lilianweng.github.io/posts/2023-06-23-agent/".to_string(),
        "https://lilianweng.github.io/posts/2024-04-12-diffusion-video/".to_string(),
    ]
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from a specific file, falling back to defaults when absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let mut config: Config = serde_yaml::from_str(&content)?;
            config.fill_secrets_from_env();
            tracing::debug!("Loaded configuration from {}", path.display());
            Ok(config)
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    /// Secrets are usually kept out of the file; take them from the environment
    fn fill_secrets_from_env(&mut self) {
        if self.llm_service.api_key.is_none() {
            self.llm_service.api_key = env_llm_api_key();
        }
        if self.tools.tavily_api_key.is_none() {
            self.tools.tavily_api_key = std::env::var("TAVILY_API_KEY").ok();
        }
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Render as YAML, the on-disk format
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("AGENTRAG_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Reject settings the graph cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.agent.max_attempts == 0 {
            return Err(AgentRagError::Config(
                "agent.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.agent.top_k == 0 {
            return Err(AgentRagError::Config(
                "agent.top_k must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.agent.relevance_threshold) {
            return Err(AgentRagError::Config(format!(
                "agent.relevance_threshold must be within [0, 1], got {}",
                self.agent.relevance_threshold
            )));
        }
        if self.ingest.chunk_size == 0 || self.ingest.chunk_overlap >= self.ingest.chunk_size {
            return Err(AgentRagError::Config(format!(
                "ingest.chunk_overlap ({}) must be smaller than ingest.chunk_size ({})",
                self.ingest.chunk_overlap, self.ingest.chunk_size
            )));
        }
        if self.llm_service.lacks_embeddings() {
            return Err(AgentRagError::Config(format!(
                "{} serves no embeddings. Set AGENTRAG_EMBEDDING_URL or llm_service.embedding_url.",
                self.llm_service.url
            )));
        }
        if self.llm_service.requires_api_key() && self.llm_service.api_key.is_none() {
            return Err(AgentRagError::Config(format!(
                "{} requires an API key. Set AGENTRAG_LLM_API_KEY or GROQ_API_KEY.",
                self.llm_service.url
            )));
        }
        Ok(())
    }

    /// Copy suitable for display, with secrets masked
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.llm_service.api_key.is_some() {
            copy.llm_service.api_key = Some(REDACTED.to_string());
        }
        if copy.tools.tavily_api_key.is_some() {
            copy.tools.tavily_api_key = Some(REDACTED.to_string());
        }
        copy
    }
}

const REDACTED: &str = "********";

//! Agentrag Core Library
//!
//! Corpus-grounded question answering with bounded web escalation.
//!
//! # Features
//! - Ingestion of URLs, raw text and PDFs into overlapping chunks
//! - In-memory vector index with HNSW pre-selection for large corpora
//! - LLM relevance grading of retrieved fragments
//! - Escalation to web search, Wikipedia and arXiv under a retry budget
//! - Answer synthesis with source attribution

pub mod agent;
pub mod config;
pub mod error;
pub mod index;
pub mod ingest;
pub mod llm;
pub mod providers;
pub mod tools;

pub use agent::{
    Agent, AgentSettings, Answer, ConversationTurn, History, Origin, Phase, Role, RunOutcome,
    TextFragment, DEFAULT_MAX_ATTEMPTS,
};
pub use config::{AgentConfig, Config, IngestConfig, LLMServiceConfig, ToolsConfig};
pub use error::{AgentRagError, Error, Result};
pub use index::{MemoryIndex, Retriever, ScoredChunk};
pub use ingest::{IngestReport, Ingestor, TextChunk};
pub use llm::{
    Classifier, Completer, Embedder, HttpClassifier, HttpCompleter, HttpEmbedder, LLMClient,
    MetricsSnapshot, RelevanceLabel, VLLMClient,
};
pub use providers::{ProviderRegistry, Source, SourceItem, SourceProvider};
pub use tools::{SearchTool, ToolHit, ToolId, ToolRegistry};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "agentrag";

//! LLM trait definitions

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Embedding generation trait
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for batch of texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Free-text completion capability
#[async_trait]
pub trait Completer: Send + Sync {
    /// Complete a prompt. Errors are either transient (timeout, rate limit)
    /// or content errors (empty/malformed output).
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Binary relevance label produced by a classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceLabel {
    Relevant,
    NotRelevant,
}

impl RelevanceLabel {
    pub fn is_relevant(self) -> bool {
        matches!(self, Self::Relevant)
    }
}

/// Relevance classification capability
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify a prompt into a relevance label
    async fn classify(&self, prompt: &str) -> Result<RelevanceLabel>;

    /// Get model name
    fn model_name(&self) -> &str;
}

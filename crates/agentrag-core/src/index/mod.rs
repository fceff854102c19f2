//! In-memory hybrid index
//!
//! Holds the embeddings of every ingested chunk and ranks them by cosine
//! similarity against the query. Large corpora get an HNSW pre-selection
//! pass; candidates are always re-scored exactly. A BM25 keyword ranking is
//! fused with the dense ranking by reciprocal rank, with equal weights.

mod ann;
mod bm25;

pub use ann::{AnnIndex, ANN_THRESHOLD};
pub use bm25::{tokenize, Bm25Index};

use crate::error::{AgentRagError, Result};
use crate::ingest::TextChunk;
use crate::llm::Embedder;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// Chunks sent to the embedding endpoint per request
const EMBED_BATCH_SIZE: usize = 32;

/// Minimum number of HNSW candidates re-scored per query
const MIN_ANN_CANDIDATES: usize = 64;

/// Reciprocal rank fusion constant
const RRF_K: f32 = 60.0;

/// A chunk and its cosine similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: TextChunk,
    pub score: f32,
}

/// Vector index capability consumed by the agent
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Top-`k` chunks for `query`, best first. Safe on an empty index.
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>>;
}

/// Cosine similarity; zero for mismatched or degenerate vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Embeddings and keyword postings for a fixed set of chunks, read-only
/// after `build`
pub struct MemoryIndex {
    chunks: Vec<TextChunk>,
    embeddings: Vec<Vec<f32>>,
    ann: AnnIndex,
    keywords: Bm25Index,
    embedder: Arc<dyn Embedder>,
}

impl MemoryIndex {
    /// Embed every chunk (in batches) and build the index
    pub async fn build(chunks: Vec<TextChunk>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let mut embeddings = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = embedder.embed_batch(&texts).await?;
            if vectors.len() != texts.len() {
                return Err(AgentRagError::Index(format!(
                    "Embedder returned {} vectors for {} chunks",
                    vectors.len(),
                    texts.len()
                )));
            }
            embeddings.extend(vectors);
        }

        let ann = AnnIndex::build(&embeddings);
        let keywords = Bm25Index::build(chunks.iter().map(|c| c.text.as_str()));
        tracing::info!(
            "Indexed {} chunks with {} (ann: {})",
            chunks.len(),
            embedder.model_name(),
            ann.is_built()
        );

        Ok(Self {
            chunks,
            embeddings,
            ann,
            keywords,
            embedder,
        })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[TextChunk] {
        &self.chunks
    }

    /// Chunk positions by descending cosine similarity.
    /// Ties keep insertion order.
    fn dense_ranking(&self, query_embedding: &[f32], k: usize) -> Vec<usize> {
        let mut candidates = if self.ann.is_built() {
            self.ann
                .candidates(query_embedding, (k * 4).max(MIN_ANN_CANDIDATES))
        } else {
            (0..self.embeddings.len()).collect()
        };
        candidates.sort_unstable();
        candidates.dedup();

        let mut scored: Vec<(usize, f32)> = candidates
            .into_iter()
            .map(|i| (i, cosine_similarity(query_embedding, &self.embeddings[i])))
            .collect();

        // Stable sort keeps ascending position among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.into_iter().map(|(i, _)| i).collect()
    }

    /// Fuse the dense and keyword rankings of `query` and keep the top `k`.
    ///
    /// Order follows the fused rank (ties fall back to dense rank, then
    /// insertion order); the reported score is always the cosine similarity.
    pub fn rank(&self, query: &str, query_embedding: &[f32], k: usize) -> Vec<ScoredChunk> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }

        // position -> (fused score, dense rank)
        let mut fused: HashMap<usize, (f32, usize)> = HashMap::new();
        for (rank, i) in self.dense_ranking(query_embedding, k).into_iter().enumerate() {
            let entry = fused.entry(i).or_insert((0.0, usize::MAX));
            entry.0 += 1.0 / (RRF_K + (rank + 1) as f32);
            entry.1 = rank;
        }
        for (rank, (i, _)) in self.keywords.search(query).into_iter().enumerate() {
            fused.entry(i).or_insert((0.0, usize::MAX)).0 += 1.0 / (RRF_K + (rank + 1) as f32);
        }

        let mut order: Vec<(usize, f32, usize)> = fused
            .into_iter()
            .map(|(i, (score, dense_rank))| (i, score, dense_rank))
            .collect();
        order.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.2.cmp(&b.2))
                .then(a.0.cmp(&b.0))
        });

        order
            .into_iter()
            .take(k)
            .map(|(i, _, _)| ScoredChunk {
                chunk: self.chunks[i].clone(),
                score: cosine_similarity(query_embedding, &self.embeddings[i]),
            })
            .collect()
    }
}

#[async_trait]
impl Retriever for MemoryIndex {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        Ok(self.rank(query, &query_embedding, k))
    }
}

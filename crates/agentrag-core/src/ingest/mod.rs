//! Ingestion pipeline
//!
//! Turns user-supplied sources (URLs, raw text, PDFs) into overlapping text
//! chunks ready for embedding.

mod chunker;

pub use chunker::{chunk_text, CHUNK_OVERLAP_CHARS, CHUNK_SIZE_CHARS};

use crate::config::IngestConfig;
use crate::error::Result;
use crate::providers::{ProviderRegistry, Source};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Fixed-size text fragment cut from a source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    pub text: String,
    /// URL, PDF file name, or raw-text label the chunk came from
    pub source: String,
    /// Character offset of the chunk within its document
    pub position: usize,
    /// SHA-256 of `text`
    pub hash: String,
}

impl TextChunk {
    /// Identifier unique to this chunk, `source#offset`
    pub fn id(&self) -> String {
        format!("{}#{}", self.source, self.position)
    }
}

/// Outcome of ingesting a batch of sources
#[derive(Debug, Default)]
pub struct IngestReport {
    pub chunks: Vec<TextChunk>,
    /// Sources that could not be loaded, with the reason
    pub failures: Vec<(String, String)>,
}

/// Loads sources through the provider registry and chunks them
pub struct Ingestor {
    registry: Arc<ProviderRegistry>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Ingestor {
    pub fn new(registry: Arc<ProviderRegistry>, config: &IngestConfig) -> Self {
        Self {
            registry,
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }

    /// Ingestor with the default providers
    pub fn with_defaults(config: &IngestConfig) -> Self {
        Self::new(Arc::new(ProviderRegistry::with_defaults()), config)
    }

    /// Load one source and split it into chunks
    pub async fn chunk(&self, source: &Source) -> Result<Vec<TextChunk>> {
        let items = self.registry.load(source).await?;

        let chunks: Vec<TextChunk> = items
            .iter()
            .flat_map(|item| {
                chunk_text(&item.uri, &item.content, self.chunk_size, self.chunk_overlap)
            })
            .collect();

        tracing::info!(
            "Ingested {}: {} document(s), {} chunk(s)",
            source.label(),
            items.len(),
            chunks.len()
        );

        Ok(chunks)
    }

    /// Ingest every source, skipping (and reporting) those that fail.
    /// `on_source` runs before each source is loaded.
    pub async fn chunk_all(
        &self,
        sources: &[Source],
        mut on_source: impl FnMut(&Source),
    ) -> IngestReport {
        let mut report = IngestReport::default();

        for source in sources {
            on_source(source);
            match self.chunk(source).await {
                Ok(mut chunks) => report.chunks.append(&mut chunks),
                Err(e) => {
                    tracing::warn!("Skipping source {}: {}", source.label(), e);
                    report.failures.push((source.label(), e.to_string()));
                }
            }
        }

        report
    }
}

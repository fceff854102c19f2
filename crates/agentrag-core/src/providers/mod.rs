//! Source provider abstraction
//!
//! Provides a unified interface for loading the user's corpus from:
//! - URLs (web pages, remote PDFs)
//! - Raw pasted text
//! - Local PDF files or directories of PDFs
//!
//! Each provider implements the SourceProvider trait; the registry
//! dispatches a [`Source`] to the provider registered for its kind.

use crate::error::{AgentRagError, Result};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

pub mod pdf;
pub mod text;
pub mod url;

pub use pdf::PDFProvider;
pub use text::TextProvider;
pub use url::URLProvider;

/// A corpus source supplied by the user
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Url(String),
    Text { label: String, body: String },
    Pdf(PathBuf),
}

impl Source {
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    pub fn text(label: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Text {
            label: label.into(),
            body: body.into(),
        }
    }

    pub fn pdf(path: impl Into<PathBuf>) -> Self {
        Self::Pdf(path.into())
    }

    /// Provider type able to load this source
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Url(_) => "url",
            Self::Text { .. } => "text",
            Self::Pdf(_) => "pdf",
        }
    }

    /// Human-readable name used in logs and reports
    pub fn label(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Text { label, .. } => label.clone(),
            Self::Pdf(path) => path.display().to_string(),
        }
    }
}

/// Source provider trait - all content sources must implement this
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    /// Provider type identifier (e.g., "url", "text", "pdf")
    fn provider_type(&self) -> &'static str;

    /// Load all documents behind a source
    async fn load(&self, source: &Source) -> Result<Vec<SourceItem>>;
}

/// Document loaded from a source provider
#[derive(Debug, Clone)]
pub struct SourceItem {
    /// Identifier used for attribution (URL, file name, text label)
    pub uri: String,

    /// Display title for the item
    pub title: String,

    /// Full text content of the item
    pub content: String,

    /// Content hash (SHA-256)
    pub hash: String,

    /// Provider type that created this item
    pub source_type: String,

    /// Provider-specific metadata (URL, file path, ...)
    pub metadata: HashMap<String, String>,
}

impl SourceItem {
    /// Create new source item, hashing its content
    pub fn new(uri: String, title: String, content: String, source_type: &str) -> Self {
        let hash = hash_content(&content);
        Self {
            uri,
            title,
            content,
            hash,
            source_type: source_type.to_string(),
            metadata: HashMap::new(),
        }
    }

    /// Add metadata to item
    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// SHA-256 of the content, hex encoded
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Registry for managing provider instances
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn SourceProvider>>,
}

impl ProviderRegistry {
    /// Create new empty registry
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Create registry with default providers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(URLProvider::new()));
        registry.register(Arc::new(TextProvider));
        registry.register(Arc::new(PDFProvider::new()));
        registry
    }

    /// Register a provider
    pub fn register(&mut self, provider: Arc<dyn SourceProvider>) {
        self.providers
            .insert(provider.provider_type().to_string(), provider);
    }

    /// Get provider by type
    pub fn get(&self, provider_type: &str) -> Option<Arc<dyn SourceProvider>> {
        self.providers.get(provider_type).cloned()
    }

    /// Load a source through the provider registered for its kind
    pub async fn load(&self, source: &Source) -> Result<Vec<SourceItem>> {
        let provider = self.get(source.kind()).ok_or_else(|| {
            AgentRagError::InvalidInput(format!(
                "No provider registered for '{}' sources",
                source.kind()
            ))
        })?;
        provider.load(source).await
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kinds_and_labels() {
        assert_eq!(Source::url("https://example.com").kind(), "url");
        assert_eq!(Source::text("notes", "body").kind(), "text");
        assert_eq!(Source::pdf("paper.pdf").kind(), "pdf");
        assert_eq!(Source::text("notes", "body").label(), "notes");
        assert_eq!(Source::pdf("dir/paper.pdf").label(), "dir/paper.pdf");
    }

    #[test]
    fn test_hash_content_is_stable() {
        let a = hash_content("hello");
        assert_eq!(a, hash_content("hello"));
        assert_ne!(a, hash_content("hello!"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_default_registry_has_all_kinds() {
        let registry = ProviderRegistry::with_defaults();
        for kind in ["url", "text", "pdf"] {
            assert!(registry.get(kind).is_some(), "missing provider {}", kind);
        }
    }

    #[tokio::test]
    async fn test_empty_registry_rejects_source() {
        let registry = ProviderRegistry::new();
        let err = registry.load(&Source::text("x", "y")).await.unwrap_err();
        assert!(matches!(err, AgentRagError::InvalidInput(_)));
    }
}

//! LLM integration
//!
//! Provides traits and implementations for:
//! - Embedding generation via external services (vLLM, OpenAI, etc.)
//! - Free-text completion (answer synthesis)
//! - Binary relevance classification (fragment grading)

mod client;
mod http_classifier;
mod http_completer;
mod http_embedder;
mod traits;

pub use client::{ChatMessage, LLMClient, MetricsSnapshot, VLLMClient};
pub use http_classifier::{parse_label, HttpClassifier};
pub use http_completer::HttpCompleter;
pub use http_embedder::HttpEmbedder;
pub use traits::*;

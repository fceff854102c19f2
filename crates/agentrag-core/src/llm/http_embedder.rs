//! Embedding through the OpenAI-compatible `/v1/embeddings` endpoint

use super::{Embedder, LLMClient};
use crate::error::{AgentRagError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Embedder backed by an [`LLMClient`].
///
/// The service response is checked before it reaches the index: one vector
/// per input, none empty, all of the same width. The first width seen
/// replaces the configured dimension count.
pub struct HttpEmbedder {
    client: Arc<dyn LLMClient>,
    observed_dimensions: AtomicUsize,
}

impl HttpEmbedder {
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self {
            client,
            observed_dimensions: AtomicUsize::new(0),
        }
    }

    fn check_width(&self, vector: &[f32]) -> Result<()> {
        if vector.is_empty() {
            return Err(AgentRagError::Llm(format!(
                "{} returned an empty embedding",
                self.client.model_name()
            )));
        }

        match self.observed_dimensions.compare_exchange(
            0,
            vector.len(),
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => Ok(()),
            Err(known) if known == vector.len() => Ok(()),
            Err(known) => Err(AgentRagError::Llm(format!(
                "embedding width changed from {} to {}",
                known,
                vector.len()
            ))),
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.client.embed(text).await?;
        self.check_width(&vector)?;
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self.client.embed_batch(texts).await?;
        if vectors.len() != texts.len() {
            return Err(AgentRagError::Llm(format!(
                "asked for {} embeddings, got {}",
                texts.len(),
                vectors.len()
            )));
        }
        for vector in &vectors {
            self.check_width(vector)?;
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        match self.observed_dimensions.load(Ordering::Relaxed) {
            0 => self.client.embedding_dimensions(),
            known => known,
        }
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;
    use std::sync::Mutex;

    /// Returns queued embedding responses in order
    struct QueuedClient {
        responses: Mutex<Vec<Vec<Vec<f32>>>>,
        batch_calls: AtomicUsize,
    }

    impl QueuedClient {
        fn new(mut responses: Vec<Vec<Vec<f32>>>) -> Arc<Self> {
            responses.reverse();
            Arc::new(Self {
                responses: Mutex::new(responses),
                batch_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LLMClient for QueuedClient {
        async fn chat_completion(&self, _messages: Vec<ChatMessage>) -> Result<String> {
            Ok(String::new())
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            let mut next = self.responses.lock().unwrap().pop().unwrap_or_default();
            Ok(next.pop().unwrap_or_default())
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.responses.lock().unwrap().pop().unwrap_or_default())
        }

        fn embedding_dimensions(&self) -> usize {
            384
        }

        fn model_name(&self) -> &str {
            "queued"
        }
    }

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("text {}", i)).collect()
    }

    #[tokio::test]
    async fn test_learns_dimensions_from_first_response() {
        let client = QueuedClient::new(vec![vec![vec![0.1, 0.2, 0.3], vec![0.3, 0.2, 0.1]]]);
        let embedder = HttpEmbedder::new(client);

        assert_eq!(embedder.dimensions(), 384);
        let vectors = embedder.embed_batch(&texts(2)).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(embedder.dimensions(), 3);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_service() {
        let client = QueuedClient::new(Vec::new());
        let embedder = HttpEmbedder::new(client.clone());

        assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
        assert_eq!(client.batch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejects_short_response() {
        let client = QueuedClient::new(vec![vec![vec![1.0, 0.0]]]);
        let err = HttpEmbedder::new(client)
            .embed_batch(&texts(3))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("asked for 3 embeddings, got 1"));
    }

    #[tokio::test]
    async fn test_rejects_width_change() {
        let client = QueuedClient::new(vec![vec![vec![1.0, 0.0]], vec![vec![1.0, 0.0, 0.0]]]);
        let embedder = HttpEmbedder::new(client);

        embedder.embed_batch(&texts(1)).await.unwrap();
        assert!(embedder.embed_batch(&texts(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_empty_vector() {
        let client = QueuedClient::new(vec![vec![Vec::new()]]);
        assert!(HttpEmbedder::new(client).embed("x").await.is_err());
    }
}

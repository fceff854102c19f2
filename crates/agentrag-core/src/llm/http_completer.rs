//! HTTP-based completion using external LLM service

use super::{ChatMessage, Completer, LLMClient};
use crate::error::{AgentRagError, Result};
use async_trait::async_trait;
use std::sync::Arc;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful and expert research assistant. \
    Answer in the language of the user's question. Be concise and factual.";

/// Completer using external HTTP LLM service
pub struct HttpCompleter {
    client: Arc<dyn LLMClient>,
    system_prompt: String,
}

impl HttpCompleter {
    /// Create from LLM client
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self {
            client,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Replace the system prompt sent before every completion
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}

#[async_trait]
impl Completer for HttpCompleter {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let messages = vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(prompt),
        ];

        let response = self.client.chat_completion(messages).await?;
        let text = response.trim();

        if text.is_empty() {
            return Err(AgentRagError::ModelOutput(
                "Empty completion from LLM".to_string(),
            ));
        }

        Ok(text.to_string())
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ScriptedClient {
        reply: String,
        seen: Mutex<Vec<ChatMessage>>,
    }

    #[async_trait]
    impl LLMClient for ScriptedClient {
        async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
            self.seen.lock().unwrap().extend(messages);
            Ok(self.reply.clone())
        }
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![])
        }
        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![])
        }
        fn embedding_dimensions(&self) -> usize {
            0
        }
        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn test_complete_trims_and_sends_system_prompt() {
        let client = Arc::new(ScriptedClient {
            reply: "  Paris.  \n".to_string(),
            seen: Mutex::new(Vec::new()),
        });
        let completer = HttpCompleter::new(client.clone()).with_system_prompt("be brief");

        let text = completer.complete("capital of France?").await.unwrap();
        assert_eq!(text, "Paris.");

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen[0].role, "system");
        assert_eq!(seen[0].content, "be brief");
        assert_eq!(seen[1].content, "capital of France?");
    }

    #[tokio::test]
    async fn test_blank_completion_is_model_output_error() {
        let client = Arc::new(ScriptedClient {
            reply: "   ".to_string(),
            seen: Mutex::new(Vec::new()),
        });
        let completer = HttpCompleter::new(client);

        let err = completer.complete("anything").await.unwrap_err();
        assert!(matches!(err, AgentRagError::ModelOutput(_)));
    }
}

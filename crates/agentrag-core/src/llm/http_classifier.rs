//! HTTP-based relevance classifier using external LLM service

use super::client::extract_json;
use super::{ChatMessage, Classifier, LLMClient, RelevanceLabel};
use crate::error::{AgentRagError, Result};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;

lazy_static! {
    // Negatives are checked first: "not relevant" starts with a positive-looking word
    static ref NEGATIVE: Regex =
        Regex::new(r"^\W*(no|non|not[\s_-]*relevant|irrelevant|false)\b").unwrap();
    static ref POSITIVE: Regex = Regex::new(r"^\W*(yes|oui|relevant|true)\b").unwrap();
}

/// Relevance classifier using external HTTP LLM service
pub struct HttpClassifier {
    client: Arc<dyn LLMClient>,
}

impl HttpClassifier {
    /// Create from LLM client
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, prompt: &str) -> Result<RelevanceLabel> {
        let messages = vec![
            ChatMessage::system(
                "You are a strict relevance grader. Decide whether the document helps answer \
                 the question. Reply with exactly one word: yes or no.",
            ),
            ChatMessage::user(prompt),
        ];

        let response = self.client.chat_completion(messages).await?;
        parse_label(&response)
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}

/// Parse a model reply into a relevance label
pub fn parse_label(response: &str) -> Result<RelevanceLabel> {
    let normalized = response.trim().to_lowercase();

    if let Some(json) = extract_json(&normalized) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(json) {
            if let Some(relevant) = value.get("relevant").and_then(|v| v.as_bool()) {
                return Ok(if relevant {
                    RelevanceLabel::Relevant
                } else {
                    RelevanceLabel::NotRelevant
                });
            }
        }
    }

    if NEGATIVE.is_match(&normalized) {
        Ok(RelevanceLabel::NotRelevant)
    } else if POSITIVE.is_match(&normalized) {
        Ok(RelevanceLabel::Relevant)
    } else {
        tracing::debug!("Unrecognized grader reply: {}", response);
        Err(AgentRagError::ModelOutput(format!(
            "Expected a yes/no relevance label, got {:?}",
            truncate(response, 80)
        )))
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_answers() {
        assert_eq!(parse_label("yes").unwrap(), RelevanceLabel::Relevant);
        assert_eq!(parse_label("Yes.").unwrap(), RelevanceLabel::Relevant);
        assert_eq!(parse_label("  NO ").unwrap(), RelevanceLabel::NotRelevant);
        assert_eq!(parse_label("oui").unwrap(), RelevanceLabel::Relevant);
        assert_eq!(parse_label("non").unwrap(), RelevanceLabel::NotRelevant);
    }

    #[test]
    fn test_label_words() {
        assert_eq!(parse_label("relevant").unwrap(), RelevanceLabel::Relevant);
        assert_eq!(
            parse_label("not_relevant").unwrap(),
            RelevanceLabel::NotRelevant
        );
        assert_eq!(
            parse_label("Not relevant - the text is about cooking").unwrap(),
            RelevanceLabel::NotRelevant
        );
        assert_eq!(
            parse_label("irrelevant").unwrap(),
            RelevanceLabel::NotRelevant
        );
    }

    #[test]
    fn test_json_answer() {
        assert_eq!(
            parse_label("```json\n{\"relevant\": true}\n```").unwrap(),
            RelevanceLabel::Relevant
        );
        assert_eq!(
            parse_label("{\"relevant\": false, \"reason\": \"off topic\"}").unwrap(),
            RelevanceLabel::NotRelevant
        );
    }

    #[test]
    fn test_word_prefix_is_not_a_match() {
        // "nothing" must not read as "no", "yesterday" must not read as "yes"
        assert!(parse_label("nothing to say").is_err());
        assert!(parse_label("yesterday it rained").is_err());
    }

    #[test]
    fn test_malformed_is_model_output_error() {
        let err = parse_label("I think maybe?").unwrap_err();
        assert!(matches!(err, AgentRagError::ModelOutput(_)));
        assert!(parse_label("").is_err());
    }
}

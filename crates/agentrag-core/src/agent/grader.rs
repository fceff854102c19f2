//! Relevance grading of gathered fragments

use super::state::{GradingVerdict, TextFragment};
use crate::llm::{Classifier, RelevanceLabel};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Build the per-fragment classification prompt
pub fn grading_prompt(query: &str, fragment: &TextFragment) -> String {
    format!(
        "Question: {}\n\nDocument (source: {}):\n{}\n\n\
         Does this document contain information that helps answer the question? \
         Answer yes or no.",
        query, fragment.source_id, fragment.text
    )
}

/// Labels each fragment with one classifier call and aggregates any-positive
pub struct Grader {
    classifier: Arc<dyn Classifier>,
    concurrency: usize,
}

impl Grader {
    pub fn new(classifier: Arc<dyn Classifier>, concurrency: usize) -> Self {
        Self {
            classifier,
            concurrency: concurrency.max(1),
        }
    }

    /// Grade `fragments` against `query`. Labels come back in fragment order;
    /// a failed or malformed classification counts as not relevant.
    pub async fn grade(&self, query: &str, fragments: &[TextFragment]) -> GradingVerdict {
        if fragments.is_empty() {
            return GradingVerdict::from_labels(Vec::new());
        }

        let labels: Vec<RelevanceLabel> = stream::iter(fragments)
            .map(|fragment| self.label(query, fragment))
            .buffered(self.concurrency)
            .collect()
            .await;

        let verdict = GradingVerdict::from_labels(labels);
        tracing::info!(
            "Graded {} fragment(s): {} relevant, {:?}",
            fragments.len(),
            verdict.labels.iter().filter(|l| l.is_relevant()).count(),
            verdict.verdict
        );
        verdict
    }

    async fn label(&self, query: &str, fragment: &TextFragment) -> RelevanceLabel {
        match self.classifier.classify(&grading_prompt(query, fragment)).await {
            Ok(label) => label,
            Err(e) => {
                tracing::warn!(
                    "Grading {} failed, treating as not relevant: {}",
                    fragment.source_id,
                    e
                );
                RelevanceLabel::NotRelevant
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AgentRagError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Relevant iff the prompt mentions the keyword; errors on "boom"
    struct KeywordClassifier {
        keyword: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Classifier for KeywordClassifier {
        async fn classify(&self, prompt: &str) -> Result<RelevanceLabel> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if prompt.contains("boom") {
                return Err(AgentRagError::ModelOutput("garbled".into()));
            }
            Ok(if prompt.contains(self.keyword) {
                RelevanceLabel::Relevant
            } else {
                RelevanceLabel::NotRelevant
            })
        }

        fn model_name(&self) -> &str {
            "keyword"
        }
    }

    fn grader(keyword: &'static str) -> (Grader, Arc<KeywordClassifier>) {
        let classifier = Arc::new(KeywordClassifier {
            keyword,
            calls: AtomicUsize::new(0),
        });
        (Grader::new(classifier.clone(), 2), classifier)
    }

    #[tokio::test]
    async fn test_empty_set_is_insufficient_without_calls() {
        let (grader, classifier) = grader("paris");
        let verdict = grader.grade("q", &[]).await;
        assert!(!verdict.is_sufficient());
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_labels_in_fragment_order() {
        let (grader, classifier) = grader("paris");
        let fragments = vec![
            TextFragment::web("berlin facts", "wikipedia:Berlin"),
            TextFragment::web("paris facts", "wikipedia:Paris"),
            TextFragment::web("rome facts", "wikipedia:Rome"),
        ];

        let verdict = grader.grade("capital?", &fragments).await;
        assert!(verdict.is_sufficient());
        assert_eq!(
            verdict.labels,
            vec![
                RelevanceLabel::NotRelevant,
                RelevanceLabel::Relevant,
                RelevanceLabel::NotRelevant
            ]
        );
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failed_call_counts_as_not_relevant() {
        let (grader, _) = grader("paris");
        let fragments = vec![TextFragment::local("boom", "doc", 0.9)];
        let verdict = grader.grade("q", &fragments).await;
        assert_eq!(verdict.labels, vec![RelevanceLabel::NotRelevant]);
        assert!(!verdict.is_sufficient());
    }

    #[test]
    fn test_prompt_mentions_query_and_source() {
        let prompt = grading_prompt("What is HNSW?", &TextFragment::local("graph index", "ann.md", 0.7));
        assert!(prompt.contains("What is HNSW?"));
        assert!(prompt.contains("source: ann.md"));
        assert!(prompt.contains("graph index"));
    }
}

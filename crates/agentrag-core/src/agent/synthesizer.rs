//! Answer synthesis with source attribution

use super::state::{Answer, ConversationTurn, Role, TextFragment};
use crate::llm::{Completer, RelevanceLabel};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::fmt::Write as _;
use std::sync::Arc;

/// Opening of every answer produced without evidence
pub const NO_EVIDENCE_NOTICE: &str =
    "No supporting evidence was found in the provided documents or on the web.";

/// System prompt for the answering model
pub const ANSWER_SYSTEM_PROMPT: &str = "You are a helpful and expert research assistant. \
    Answer using only the numbered context when it is provided and cite the sources you use \
    with their bracketed numbers, e.g. [1]. If the context does not contain the answer, say so. \
    Answer in the language of the question.";

lazy_static! {
    static ref CITATION_MARK: Regex = Regex::new(r"\[(\d{1,3})\]").unwrap();
}

/// Turns accumulated fragments into the final answer
pub struct Synthesizer {
    completer: Arc<dyn Completer>,
    history_window: usize,
    relevance_threshold: f32,
}

impl Synthesizer {
    pub fn new(completer: Arc<dyn Completer>, history_window: usize, relevance_threshold: f32) -> Self {
        Self {
            completer,
            history_window,
            relevance_threshold,
        }
    }

    /// Compose an answer. `labels` are the grader's labels, aligned with
    /// `fragments`. Never fails: model errors and blank completions degrade
    /// to an extractive or no-evidence answer.
    pub async fn synthesize(
        &self,
        query: &str,
        history: &[ConversationTurn],
        fragments: &[TextFragment],
        labels: &[RelevanceLabel],
    ) -> Answer {
        let context = self.build_context(fragments, labels);
        let recent = &history[history.len().saturating_sub(self.history_window)..];

        if context.is_empty() {
            return self.answer_without_evidence(query, recent).await;
        }

        let prompt = build_prompt(query, recent, &context);
        tracing::debug!("Synthesis prompt: {} chars, {} sources", prompt.len(), context.len());

        let text = match self.completer.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                tracing::warn!("Completion was blank, falling back to extractive answer");
                return extractive_fallback(&context);
            }
            Err(e) => {
                tracing::warn!("Completion failed, falling back to extractive answer: {}", e);
                return extractive_fallback(&context);
            }
        };

        let mut cited = extract_citations(&text, &context);
        if cited.is_empty() {
            cited = context
                .iter()
                .filter(|entry| entry.relevant)
                .map(|entry| entry.fragment.source_id.clone())
                .collect();
        }

        let grounded = context
            .iter()
            .any(|entry| entry.relevant && cited.contains(&entry.fragment.source_id));
        Answer {
            text,
            cited_sources: cited,
            grounded,
        }
    }

    /// First occurrence of each source id, in order, with its relevance.
    ///
    /// Relevance is that of the kept fragment only: a relevant duplicate that
    /// never reaches the prompt cannot ground the answer.
    fn build_context<'f>(
        &self,
        fragments: &'f [TextFragment],
        labels: &[RelevanceLabel],
    ) -> Vec<ContextEntry<'f>> {
        let mut seen = HashSet::new();
        fragments
            .iter()
            .enumerate()
            .filter(|(_, fragment)| seen.insert(fragment.source_id.as_str()))
            .map(|(i, fragment)| ContextEntry {
                fragment,
                relevant: labels.get(i).is_some_and(|l| l.is_relevant())
                    || fragment
                        .relevance_score
                        .is_some_and(|s| s > self.relevance_threshold),
            })
            .collect()
    }

    async fn answer_without_evidence(&self, query: &str, recent: &[ConversationTurn]) -> Answer {
        let prompt = format!(
            "{}No documents are available for this question. Answer briefly from general \
             knowledge and state that the answer is not backed by sources.\n\nQuestion: {}",
            format_history(recent),
            query
        );

        let text = match self.completer.complete(&prompt).await {
            Ok(best_effort) if !best_effort.trim().is_empty() => {
                format!("{}\n\n{}", NO_EVIDENCE_NOTICE, best_effort.trim())
            }
            Ok(_) => NO_EVIDENCE_NOTICE.to_string(),
            Err(e) => {
                tracing::warn!("Best-effort completion failed: {}", e);
                NO_EVIDENCE_NOTICE.to_string()
            }
        };

        Answer {
            text,
            cited_sources: BTreeSet::new(),
            grounded: false,
        }
    }
}

/// A fragment placed in the numbered context
struct ContextEntry<'f> {
    fragment: &'f TextFragment,
    /// Labelled relevant or scored above the threshold
    relevant: bool,
}

fn format_history(turns: &[ConversationTurn]) -> String {
    if turns.is_empty() {
        return String::new();
    }

    let mut out = String::from("Conversation so far:\n");
    for turn in turns {
        let speaker = match turn.role {
            Role::User => "User",
            Role::Agent => "Assistant",
        };
        let _ = writeln!(out, "{}: {}", speaker, turn.text);
    }
    out.push('\n');
    out
}

fn build_prompt(query: &str, history: &[ConversationTurn], context: &[ContextEntry<'_>]) -> String {
    let mut prompt = format_history(history);
    prompt.push_str("Context:\n");
    for (i, entry) in context.iter().enumerate() {
        let _ = writeln!(
            prompt,
            "[{}] (source: {})\n{}\n",
            i + 1,
            entry.fragment.source_id,
            entry.fragment.text.trim()
        );
    }
    let _ = write!(prompt, "Question: {}\nAnswer:", query);
    prompt
}

/// Sources the answer refers to, by `[n]` marker or by literal id
fn extract_citations(text: &str, context: &[ContextEntry<'_>]) -> BTreeSet<String> {
    let mut cited = BTreeSet::new();

    for caps in CITATION_MARK.captures_iter(text) {
        if let Ok(n) = caps[1].parse::<usize>() {
            if let Some(entry) = n.checked_sub(1).and_then(|i| context.get(i)) {
                cited.insert(entry.fragment.source_id.clone());
            }
        }
    }

    for entry in context {
        if text.contains(entry.fragment.source_id.as_str()) {
            cited.insert(entry.fragment.source_id.clone());
        }
    }

    cited
}

fn extractive_fallback(context: &[ContextEntry<'_>]) -> Answer {
    let best = context
        .iter()
        .filter(|entry| entry.relevant)
        .map(|entry| entry.fragment)
        .fold(None::<&TextFragment>, |best, f| match best {
            Some(b) if b.relevance_score.unwrap_or(0.0) >= f.relevance_score.unwrap_or(0.0) => {
                Some(b)
            }
            _ => Some(f),
        });

    match best {
        Some(fragment) => Answer {
            text: format!(
                "The language model could not answer. Most relevant evidence [{}]:\n{}",
                fragment.source_id,
                fragment.text.trim()
            ),
            cited_sources: BTreeSet::from([fragment.source_id.clone()]),
            grounded: true,
        },
        None => Answer {
            text: NO_EVIDENCE_NOTICE.to_string(),
            cited_sources: BTreeSet::new(),
            grounded: false,
        },
    }
}

//! Data carried through one agent run

use super::graph::Phase;
use crate::llm::RelevanceLabel;
use crate::tools::ToolId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Append-only conversation log, owned by the caller across runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    turns: Vec<ConversationTurn>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// The last `n` turns, oldest first
    pub fn recent(&self, n: usize) -> &[ConversationTurn] {
        &self.turns[self.turns.len().saturating_sub(n)..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Local,
    Web,
}

/// A piece of evidence, from the corpus or from a web tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    pub origin: Origin,
    pub source_id: String,
    pub relevance_score: Option<f32>,
}

impl TextFragment {
    pub fn local(text: impl Into<String>, source_id: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Local,
            source_id: source_id.into(),
            relevance_score: Some(score),
        }
    }

    pub fn web(text: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Web,
            source_id: source_id.into(),
            relevance_score: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Sufficient,
    Insufficient,
}

/// Outcome of grading a fragment set: one label per fragment, any-positive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingVerdict {
    pub verdict: Verdict,
    pub labels: Vec<RelevanceLabel>,
}

impl GradingVerdict {
    pub fn from_labels(labels: Vec<RelevanceLabel>) -> Self {
        let verdict = if labels.iter().any(|l| l.is_relevant()) {
            Verdict::Sufficient
        } else {
            Verdict::Insufficient
        };
        Self { verdict, labels }
    }

    pub fn is_sufficient(&self) -> bool {
        self.verdict == Verdict::Sufficient
    }
}

/// Mutable state of one `run`, never shared between calls
#[derive(Debug)]
pub struct AgentState<'a> {
    pub query: String,
    pub history: &'a [ConversationTurn],
    fragments: Vec<TextFragment>,
    attempt_count: u32,
    pub verdict: Option<GradingVerdict>,
}

impl<'a> AgentState<'a> {
    pub fn new(query: impl Into<String>, history: &'a [ConversationTurn]) -> Self {
        Self {
            query: query.into(),
            history,
            fragments: Vec::new(),
            attempt_count: 0,
            verdict: None,
        }
    }

    pub fn fragments(&self) -> &[TextFragment] {
        &self.fragments
    }

    /// Fragments only ever accumulate
    pub fn extend_fragments(&mut self, fragments: Vec<TextFragment>) {
        self.fragments.extend(fragments);
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn begin_escalation(&mut self) {
        self.attempt_count += 1;
    }

    pub fn labels(&self) -> &[RelevanceLabel] {
        self.verdict
            .as_ref()
            .map(|v| v.labels.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_sufficient(&self) -> bool {
        self.verdict.as_ref().is_some_and(GradingVerdict::is_sufficient)
    }
}

/// Final reply handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub cited_sources: BTreeSet<String>,
    pub grounded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolFailure {
    pub tool: ToolId,
    pub message: String,
}

/// An answer plus the path the graph took to produce it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub answer: Answer,
    /// Escalation cycles consumed
    pub attempts: u32,
    pub verdict: Verdict,
    pub fragments: Vec<TextFragment>,
    pub labels: Vec<RelevanceLabel>,
    pub trace: Vec<Phase>,
    pub tool_failures: Vec<ToolFailure>,
}

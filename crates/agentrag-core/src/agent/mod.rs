//! Agentic decision graph
//!
//! Routes a query through local retrieval, relevance grading, bounded web
//! escalation and answer synthesis:
//!
//! ```text
//! Start -> Retrieved -> Graded -+-> Answering -> Done
//!                        ^      |
//!                        +- Escalating (while insufficient and budget remains)
//! ```
//!
//! The graph is a [`Phase`] enum plus the pure [`next_phase`] function; the
//! driver in [`Agent::run_traced`] performs each phase's side effect.

mod escalation;
mod grader;
mod graph;
mod retrieval;
mod router;
mod state;
mod synthesizer;

pub use escalation::{search_web, EscalationResult};
pub use grader::{grading_prompt, Grader};
pub use graph::{next_phase, step_limit, Phase, Progress};
pub use retrieval::{normalize_query, retrieve_local};
pub use router::{has_academic_intent, select_tools};
pub use state::{
    AgentState, Answer, ConversationTurn, GradingVerdict, History, Origin, Role, RunOutcome,
    TextFragment, ToolFailure, Verdict,
};
pub use synthesizer::{Synthesizer, ANSWER_SYSTEM_PROMPT, NO_EVIDENCE_NOTICE};

use crate::config::Config;
use crate::error::Result;
use crate::index::{MemoryIndex, Retriever};
use crate::ingest::TextChunk;
use crate::llm::{
    Classifier, Completer, HttpClassifier, HttpCompleter, HttpEmbedder, MetricsSnapshot,
    VLLMClient,
};
use crate::tools::ToolRegistry;
use std::sync::Arc;
use std::time::Duration;

/// Escalation cycles allowed per query unless configured otherwise
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Graph tuning, resolved from [`crate::config::AgentConfig`] and tool timeouts
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub max_attempts: u32,
    pub top_k: usize,
    pub min_similarity: f32,
    pub relevance_threshold: f32,
    pub history_window: usize,
    pub grader_concurrency: usize,
    pub tool_timeout: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl AgentSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.agent.max_attempts,
            top_k: config.agent.top_k,
            min_similarity: config.agent.min_similarity as f32,
            relevance_threshold: config.agent.relevance_threshold as f32,
            history_window: config.agent.history_window,
            grader_concurrency: config.agent.grader_concurrency,
            tool_timeout: Duration::from_secs(config.tools.timeout_secs),
        }
    }
}

/// Corpus-grounded question answering agent.
///
/// Shared collaborators are read-only; each `run` owns its own state.
pub struct Agent {
    retriever: Arc<dyn Retriever>,
    grader: Grader,
    synthesizer: Synthesizer,
    tools: ToolRegistry,
    settings: AgentSettings,
    llm: Option<Arc<VLLMClient>>,
}

impl Agent {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        completer: Arc<dyn Completer>,
        classifier: Arc<dyn Classifier>,
        tools: ToolRegistry,
        settings: AgentSettings,
    ) -> Self {
        Self {
            retriever,
            grader: Grader::new(classifier, settings.grader_concurrency),
            synthesizer: Synthesizer::new(
                completer,
                settings.history_window,
                settings.relevance_threshold,
            ),
            tools,
            settings,
            llm: None,
        }
    }

    /// Wire the HTTP backends from configuration and index `chunks`.
    ///
    /// Fails on invalid configuration or if the corpus cannot be embedded.
    pub async fn from_config(config: &Config, chunks: Vec<TextChunk>) -> Result<Self> {
        config.validate()?;

        let client = Arc::new(VLLMClient::new(config.llm_service.clone())?);
        let embedder = Arc::new(HttpEmbedder::new(client.clone()));
        let index = MemoryIndex::build(chunks, embedder).await?;

        let completer =
            HttpCompleter::new(client.clone()).with_system_prompt(ANSWER_SYSTEM_PROMPT);
        let classifier = HttpClassifier::new(client.clone());
        let tools = ToolRegistry::from_config(&config.tools)?;

        let mut agent = Self::new(
            Arc::new(index),
            Arc::new(completer),
            Arc::new(classifier),
            tools,
            AgentSettings::from_config(config),
        );
        agent.llm = Some(client);
        Ok(agent)
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Request counters of the HTTP LLM client, when one is in use
    pub fn llm_metrics(&self) -> Option<MetricsSnapshot> {
        self.llm.as_ref().map(|client| client.metrics())
    }

    /// Answer `query`, appending the exchange to `history`
    pub async fn run(&self, query: &str, history: &mut History) -> Answer {
        self.run_traced(query, history).await.answer
    }

    /// Local retrieval only: no grading, escalation or synthesis
    pub async fn debug_retrieve(&self, query: &str) -> Vec<TextFragment> {
        retrieve_local(
            self.retriever.as_ref(),
            query,
            self.settings.top_k,
            self.settings.min_similarity,
        )
        .await
    }

    /// Like [`Agent::run`], also reporting the path taken through the graph
    pub async fn run_traced(&self, query: &str, history: &mut History) -> RunOutcome {
        let max_attempts = self.settings.max_attempts;
        let limit = step_limit(max_attempts);

        let mut state = AgentState::new(query, history.turns());
        let mut phase = Phase::Start;
        let mut trace = Vec::new();
        let mut tool_failures = Vec::new();
        let mut answer = None;
        let mut steps = 0usize;

        while phase != Phase::Done {
            if steps >= limit && phase != Phase::Answering {
                tracing::warn!("Step limit {} reached in {:?}, forcing an answer", limit, phase);
                phase = Phase::Answering;
            }
            trace.push(phase);
            steps += 1;

            match phase {
                Phase::Start => {
                    let fragments = self.debug_retrieve(&state.query).await;
                    state.extend_fragments(fragments);
                }
                Phase::Retrieved => {
                    state.verdict = Some(self.grader.grade(&state.query, state.fragments()).await);
                }
                Phase::Graded => {}
                Phase::Escalating => {
                    let tools = select_tools(&state.query, state.attempt_count() - 1);
                    tracing::info!(
                        "Escalation {}/{} via {:?}",
                        state.attempt_count(),
                        max_attempts,
                        tools
                    );

                    let result =
                        search_web(&self.tools, &state.query, &tools, self.settings.tool_timeout)
                            .await;
                    tool_failures.extend(result.failures);

                    if result.fragments.is_empty() {
                        tracing::info!("Escalation produced no new fragments");
                    } else {
                        state.extend_fragments(result.fragments);
                        state.verdict =
                            Some(self.grader.grade(&state.query, state.fragments()).await);
                    }
                }
                Phase::Answering => {
                    answer = Some(
                        self.synthesizer
                            .synthesize(
                                &state.query,
                                state.history,
                                state.fragments(),
                                state.labels(),
                            )
                            .await,
                    );
                }
                Phase::Done => {}
            }

            let next = next_phase(
                phase,
                Progress {
                    sufficient: state.is_sufficient(),
                    attempt_count: state.attempt_count(),
                    max_attempts,
                },
            );
            if next == Phase::Escalating {
                state.begin_escalation();
            }
            tracing::debug!("{:?} -> {:?}", phase, next);
            phase = next;
        }
        trace.push(Phase::Done);

        let answer = answer.unwrap_or_else(|| Answer {
            text: NO_EVIDENCE_NOTICE.to_string(),
            cited_sources: Default::default(),
            grounded: false,
        });

        let attempts = state.attempt_count();
        let verdict = if state.is_sufficient() {
            Verdict::Sufficient
        } else {
            Verdict::Insufficient
        };
        let labels = state.labels().to_vec();
        let fragments = state.fragments().to_vec();

        history.push(ConversationTurn::user(query));
        history.push(ConversationTurn::agent(answer.text.clone()));

        tracing::info!(
            "Answered after {} escalation(s): grounded={}, {} source(s) cited",
            attempts,
            answer.grounded,
            answer.cited_sources.len()
        );

        RunOutcome {
            answer,
            attempts,
            verdict,
            fragments,
            labels,
            trace,
            tool_failures,
        }
    }
}

//! External search tools
//!
//! Each tool implements [`SearchTool`] and is looked up by [`ToolId`] in a
//! [`ToolRegistry`]; the agent never names a concrete tool type.

mod arxiv;
mod tavily;
mod wikipedia;

pub use arxiv::ArxivTool;
pub use tavily::TavilyTool;
pub use wikipedia::WikipediaTool;

use crate::config::ToolsConfig;
use crate::error::{AgentRagError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Kinds of external search the agent can escalate to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolId {
    GeneralWebSearch,
    Encyclopedia,
    AcademicPreprint,
}

impl ToolId {
    pub const ALL: [ToolId; 3] = [
        ToolId::GeneralWebSearch,
        ToolId::Encyclopedia,
        ToolId::AcademicPreprint,
    ];

    /// Short name of the backing service, used to prefix source ids
    pub fn name(&self) -> &'static str {
        match self {
            ToolId::GeneralWebSearch => "tavily",
            ToolId::Encyclopedia => "wikipedia",
            ToolId::AcademicPreprint => "arxiv",
        }
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            ToolId::GeneralWebSearch => "general_web_search",
            ToolId::Encyclopedia => "encyclopedia",
            ToolId::AcademicPreprint => "academic_preprint",
        };
        f.write_str(id)
    }
}

/// One raw search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolHit {
    pub text: String,
    /// URL, article title or paper id, as the service reports it
    pub source_id: String,
}

/// Uniform interface over web search backends
#[async_trait]
pub trait SearchTool: Send + Sync {
    fn id(&self) -> ToolId;

    async fn search(&self, query: &str) -> Result<Vec<ToolHit>>;
}

/// Tools available to the agent, keyed by id
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<ToolId, Arc<dyn SearchTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wikipedia and arXiv always; Tavily only when an API key is configured
    pub fn from_config(config: &ToolsConfig) -> Result<Self> {
        let client = http_client(config)?;
        let mut registry = Self::new();

        match config.tavily_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            Some(key) => registry.register(Arc::new(TavilyTool::new(
                client.clone(),
                key.to_string(),
                config.tavily_max_results,
            ))),
            None => tracing::warn!("TAVILY_API_KEY not set, general web search disabled"),
        }

        registry.register(Arc::new(WikipediaTool::new(
            client.clone(),
            &config.wikipedia_lang,
            config.wikipedia_top_k,
        )));
        registry.register(Arc::new(ArxivTool::new(
            client,
            config.arxiv_top_k,
            config.arxiv_max_chars,
        )));

        Ok(registry)
    }

    /// Register a tool, replacing any tool with the same id
    pub fn register(&mut self, tool: Arc<dyn SearchTool>) {
        self.tools.insert(tool.id(), tool);
    }

    pub fn get(&self, id: ToolId) -> Option<Arc<dyn SearchTool>> {
        self.tools.get(&id).cloned()
    }

    pub fn ids(&self) -> Vec<ToolId> {
        self.tools.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Shared HTTP client for all tools
pub fn http_client(config: &ToolsConfig) -> Result<Client> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(AgentRagError::Http)
}

/// Map a transport error to the error taxonomy
fn send_error(tool: ToolId, e: reqwest::Error) -> AgentRagError {
    if e.is_timeout() {
        AgentRagError::Timeout(tool.name().to_string())
    } else {
        AgentRagError::Tool {
            tool: tool.name().to_string(),
            message: e.to_string(),
        }
    }
}

/// Reject non-success responses with a tool error (429 is transient)
fn check_status(tool: ToolId, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(AgentRagError::RateLimited(tool.name().to_string()));
    }
    Err(AgentRagError::Tool {
        tool: tool.name().to_string(),
        message: format!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )
        .trim_end()
        .to_string(),
    })
}

/// Collapse runs of whitespace and cut to at most `max_chars` characters
pub(crate) fn clean_snippet(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let mut cut: String = collapsed.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullTool(ToolId);

    #[async_trait]
    impl SearchTool for NullTool {
        fn id(&self) -> ToolId {
            self.0
        }

        async fn search(&self, _query: &str) -> Result<Vec<ToolHit>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_tool_names_and_display() {
        assert_eq!(ToolId::GeneralWebSearch.name(), "tavily");
        assert_eq!(ToolId::Encyclopedia.to_string(), "encyclopedia");
        assert_eq!(
            serde_json::to_string(&ToolId::AcademicPreprint).unwrap(),
            "\"academic_preprint\""
        );
    }

    #[test]
    fn test_registry_without_tavily_key() {
        let config = ToolsConfig {
            tavily_api_key: None,
            ..ToolsConfig::default()
        };
        let registry = ToolRegistry::from_config(&config).unwrap();
        assert!(registry.get(ToolId::GeneralWebSearch).is_none());
        assert_eq!(
            registry.ids(),
            vec![ToolId::Encyclopedia, ToolId::AcademicPreprint]
        );
    }

    #[test]
    fn test_registry_with_tavily_key() {
        let config = ToolsConfig {
            tavily_api_key: Some("tvly-test".into()),
            ..ToolsConfig::default()
        };
        let registry = ToolRegistry::from_config(&config).unwrap();
        assert_eq!(registry.ids().len(), 3);
    }

    #[test]
    fn test_register_replaces_same_id() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(NullTool(ToolId::Encyclopedia)));
        registry.register(Arc::new(NullTool(ToolId::Encyclopedia)));
        assert_eq!(registry.ids(), vec![ToolId::Encyclopedia]);
    }

    #[test]
    fn test_clean_snippet() {
        assert_eq!(clean_snippet("  a \n\n b  ", 10), "a b");
        assert_eq!(clean_snippet("abcdef", 3), "abc...");
    }
}

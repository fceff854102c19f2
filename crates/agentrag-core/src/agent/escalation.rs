//! Web escalation: run the routed tools and normalize their hits

use super::state::{TextFragment, ToolFailure};
use crate::error::AgentRagError;
use crate::tools::{ToolHit, ToolId, ToolRegistry};
use futures::future::join_all;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct EscalationResult {
    pub fragments: Vec<TextFragment>,
    pub failures: Vec<ToolFailure>,
}

/// Query every tool in `tools` concurrently, each under `timeout`.
///
/// Fragments come back grouped in tool order. Tools missing from the
/// registry are skipped; failing tools are reported, never fatal.
pub async fn search_web(
    registry: &ToolRegistry,
    query: &str,
    tools: &[ToolId],
    timeout: Duration,
) -> EscalationResult {
    let available: Vec<_> = tools
        .iter()
        .filter_map(|&id| match registry.get(id) {
            Some(tool) => Some((id, tool)),
            None => {
                tracing::debug!("Tool {} not configured, skipping", id);
                None
            }
        })
        .collect();

    let calls = available.iter().map(|(id, tool)| async move {
        let outcome = match tokio::time::timeout(timeout, tool.search(query)).await {
            Ok(result) => result,
            Err(_) => Err(AgentRagError::Timeout(format!(
                "{} after {}s",
                id.name(),
                timeout.as_secs()
            ))),
        };
        (*id, outcome)
    });

    let mut result = EscalationResult::default();
    for (id, outcome) in join_all(calls).await {
        match outcome {
            Ok(hits) => {
                let before = result.fragments.len();
                result.fragments.extend(to_fragments(id, hits));
                tracing::info!(
                    "Tool {} returned {} fragment(s)",
                    id,
                    result.fragments.len() - before
                );
            }
            Err(e) => {
                let kind = if e.is_transient() { "transient" } else { "permanent" };
                tracing::warn!("Tool {} failed ({}): {}", id, kind, e);
                result.failures.push(ToolFailure {
                    tool: id,
                    message: e.to_string(),
                });
            }
        }
    }

    result
}

/// Normalize raw hits: drop empty text, prefix every id with the tool name
fn to_fragments(id: ToolId, hits: Vec<ToolHit>) -> Vec<TextFragment> {
    hits.into_iter()
        .filter(|hit| !hit.text.trim().is_empty())
        .map(|hit| {
            let raw = hit.source_id.trim();
            let source_id = if raw.is_empty() {
                id.name().to_string()
            } else {
                format!("{}:{}", id.name(), raw)
            };
            TextFragment::web(hit.text.trim(), source_id)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::state::Origin;
    use crate::error::Result;
    use crate::tools::SearchTool;
    use async_trait::async_trait;
    use std::sync::Arc;

    enum Behavior {
        Hits(Vec<ToolHit>),
        Fail,
        Hang,
    }

    struct FakeTool {
        id: ToolId,
        behavior: Behavior,
    }

    #[async_trait]
    impl SearchTool for FakeTool {
        fn id(&self) -> ToolId {
            self.id
        }

        async fn search(&self, _query: &str) -> Result<Vec<ToolHit>> {
            match &self.behavior {
                Behavior::Hits(hits) => Ok(hits.clone()),
                Behavior::Fail => Err(AgentRagError::RateLimited(self.id.name().into())),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Vec::new())
                }
            }
        }
    }

    fn hit(text: &str, source_id: &str) -> ToolHit {
        ToolHit {
            text: text.into(),
            source_id: source_id.into(),
        }
    }

    fn registry(tools: Vec<FakeTool>) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        for tool in tools {
            registry.register(Arc::new(tool));
        }
        registry
    }

    #[tokio::test]
    async fn test_merges_in_tool_order_with_prefixes() {
        let registry = registry(vec![
            FakeTool {
                id: ToolId::Encyclopedia,
                behavior: Behavior::Hits(vec![hit("Paris is the capital.", "Paris")]),
            },
            FakeTool {
                id: ToolId::GeneralWebSearch,
                behavior: Behavior::Hits(vec![
                    hit("France travel guide", "https://example.com/fr"),
                    hit("   ", "https://example.com/empty"),
                    hit("Unattributed", ""),
                ]),
            },
        ]);

        let result = search_web(
            &registry,
            "capital of France",
            &[ToolId::GeneralWebSearch, ToolId::Encyclopedia],
            Duration::from_secs(5),
        )
        .await;

        let ids: Vec<&str> = result.fragments.iter().map(|f| f.source_id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["tavily:https://example.com/fr", "tavily", "wikipedia:Paris"]
        );
        assert!(result.fragments.iter().all(|f| f.origin == Origin::Web));
        assert!(result.failures.is_empty());
    }

    #[tokio::test]
    async fn test_failures_are_reported_and_skipped() {
        let registry = registry(vec![
            FakeTool {
                id: ToolId::GeneralWebSearch,
                behavior: Behavior::Fail,
            },
            FakeTool {
                id: ToolId::Encyclopedia,
                behavior: Behavior::Hits(vec![hit("text", "Page")]),
            },
        ]);

        let result = search_web(
            &registry,
            "q",
            &[ToolId::GeneralWebSearch, ToolId::Encyclopedia],
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(result.fragments.len(), 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].tool, ToolId::GeneralWebSearch);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_tool_times_out() {
        let registry = registry(vec![FakeTool {
            id: ToolId::AcademicPreprint,
            behavior: Behavior::Hang,
        }]);

        let result = search_web(
            &registry,
            "q",
            &[ToolId::AcademicPreprint],
            Duration::from_secs(2),
        )
        .await;

        assert!(result.fragments.is_empty());
        assert_eq!(result.failures.len(), 1);
        assert!(result.failures[0].message.contains("Timed out"));
    }

    #[tokio::test]
    async fn test_unregistered_tools_are_skipped() {
        let result = search_web(
            &ToolRegistry::new(),
            "q",
            &[ToolId::GeneralWebSearch],
            Duration::from_secs(1),
        )
        .await;
        assert!(result.fragments.is_empty());
        assert!(result.failures.is_empty());
    }
}

//! One-shot question

use super::{build_agent, join_query};
use crate::app::{AskArgs, OutputFormat};
use crate::output;
use agentrag_core::History;
use anyhow::Result;
use std::path::PathBuf;

pub async fn run(args: AskArgs, config_path: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let query = join_query(&args.query);
    let agent = build_agent(&args.sources, config_path.as_deref(), format).await?;

    let mut history = History::new();
    let outcome = agent.run_traced(&query, &mut history).await;

    if let Some(metrics) = agent.llm_metrics() {
        tracing::debug!(
            "LLM requests: {} ({} errors, {:.0} ms avg)",
            metrics.total_requests,
            metrics.total_errors,
            metrics.avg_latency_ms
        );
    }

    output::print_outcome(&outcome, format)?;
    Ok(())
}

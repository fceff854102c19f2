//! Local retrieval only, for checking what the corpus returns

use super::{build_agent, join_query};
use crate::app::{AskArgs, OutputFormat};
use crate::output;
use anyhow::Result;
use std::path::PathBuf;

pub async fn run(args: AskArgs, config_path: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let query = join_query(&args.query);
    let agent = build_agent(&args.sources, config_path.as_deref(), format).await?;

    let fragments = agent.debug_retrieve(&query).await;
    output::print_fragments(&fragments, format)?;
    Ok(())
}

//! CLI command handlers

pub mod ask;
pub mod chat;
pub mod config;
pub mod retrieve;

use crate::app::{OutputFormat, SourceArgs};
use crate::progress::ProgressReporter;
use agentrag_core::{Agent, AgentRagError, Config, Ingestor, Source};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load the configuration from `path` or the default location
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(Config::default_path);
    Config::load_from(&path).with_context(|| format!("loading {}", path.display()))
}

/// Sources named on the command line, or the configured defaults
pub fn collect_sources(args: &SourceArgs, config: &Config) -> Result<Vec<Source>> {
    if args.is_empty() {
        return Ok(config
            .ingest
            .default_urls
            .iter()
            .map(Source::url)
            .collect());
    }

    let mut sources: Vec<Source> = args.urls.iter().map(Source::url).collect();

    for path in &args.text_files {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        sources.push(Source::text(label, body));
    }

    for (i, text) in args.texts.iter().enumerate() {
        let label = if args.texts.len() == 1 {
            "raw text".to_string()
        } else {
            format!("raw text {}", i + 1)
        };
        sources.push(Source::text(label, text.clone()));
    }

    sources.extend(args.pdfs.iter().map(PathBuf::as_path).map(Source::pdf));
    Ok(sources)
}

/// Ingest the sources and wire an agent over the resulting index
pub async fn build_agent(
    args: &SourceArgs,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> Result<Agent> {
    let config = load_config(config_path)?;
    config.validate()?;

    let sources = collect_sources(args, &config)?;
    let ingestor = Ingestor::with_defaults(&config.ingest);
    let mut progress = ProgressReporter::new(sources.len(), format == OutputFormat::Cli);

    let report = ingestor
        .chunk_all(&sources, |source| progress.start(&source.label()))
        .await;
    progress.finish(&report);

    if report.chunks.is_empty() {
        return Err(AgentRagError::Config(
            "index not built: no text could be ingested from the given sources".to_string(),
        )
        .into());
    }

    Ok(Agent::from_config(&config, report.chunks).await?)
}

/// Join the words of a query given as separate arguments
pub fn join_query(words: &[String]) -> String {
    words.join(" ")
}

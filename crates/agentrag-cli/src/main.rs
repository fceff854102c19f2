//! Agentrag CLI
//!
//! Chat with your own documents, escalating to web search only when they
//! fall short.

use agentrag_core::AgentRagError;
use anyhow::Result;
use clap::Parser;

mod app;
mod commands;
mod output;
mod progress;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<AgentRagError>()
            .map(AgentRagError::exit_code)
            .unwrap_or(agentrag_core::error::exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone();

    match cli.command {
        Commands::Ask(args) => commands::ask::run(args, config_path, cli.format).await,
        Commands::Chat(args) => commands::chat::run(args, config_path, cli.format).await,
        Commands::Retrieve(args) => commands::retrieve::run(args, config_path, cli.format).await,
        Commands::Config(args) => commands::config::run(args, config_path, cli.format),
    }
}

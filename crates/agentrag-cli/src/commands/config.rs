//! Configuration inspection

use super::load_config;
use crate::app::{ConfigAction, ConfigArgs, OutputFormat};
use agentrag_core::{AgentRagError, Config};
use anyhow::Result;
use std::path::PathBuf;

pub fn run(args: ConfigArgs, config_path: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let path = config_path.clone().unwrap_or_else(Config::default_path);

    match args.action {
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let config = load_config(config_path.as_deref())?.redacted();
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
                OutputFormat::Cli => print!("{}", config.to_yaml()?),
            }
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(AgentRagError::InvalidInput(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                ))
                .into());
            }
            let mut config = Config::default();
            // Keys stay in the environment
            config.llm_service.api_key = None;
            config.tools.tavily_api_key = None;
            config.save_to(&path)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

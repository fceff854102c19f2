//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agentrag")]
#[command(
    author,
    version,
    about = "Ask questions about your own documents, with web search as a fallback"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, env = "AGENTRAG_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Answer a single question
    Ask(AskArgs),

    /// Interactive conversation over the corpus
    Chat(SourceArgs),

    /// Show what local retrieval returns for a query, without answering
    Retrieve(AskArgs),

    /// Inspect or create the configuration file
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct AskArgs {
    /// Question to ask
    #[arg(required = true)]
    pub query: Vec<String>,

    #[command(flatten)]
    pub sources: SourceArgs,
}

/// Corpus sources; the configured default URLs are used when none are given
#[derive(Args, Default)]
pub struct SourceArgs {
    /// Web page or remote PDF to ingest (repeatable)
    #[arg(long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Plain-text file to ingest as raw text (repeatable)
    #[arg(long = "text-file", value_name = "FILE")]
    pub text_files: Vec<PathBuf>,

    /// Raw text to ingest (repeatable)
    #[arg(long = "text", value_name = "TEXT")]
    pub texts: Vec<String>,

    /// PDF file or directory of PDFs to ingest (repeatable)
    #[arg(long = "pdf", value_name = "PATH")]
    pub pdfs: Vec<PathBuf>,
}

impl SourceArgs {
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
            && self.text_files.is_empty()
            && self.texts.is_empty()
            && self.pdfs.is_empty()
    }
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (secrets masked)
    Show,
    /// Print the configuration file path
    Path,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Cli,
    Json,
}

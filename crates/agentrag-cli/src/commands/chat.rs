//! Interactive conversation over stdin

use super::build_agent;
use crate::app::{OutputFormat, SourceArgs};
use crate::output;
use agentrag_core::{Agent, History, Role};
use anyhow::Result;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const HELP: &str = "Commands: /test-retriever <query>, /history, /help, /quit";

/// A parsed line of chat input
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Question(&'a str),
    TestRetriever(&'a str),
    History,
    Help,
    Quit,
    Empty,
    Unknown(&'a str),
}

fn parse_input(line: &str) -> ChatInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    if !line.starts_with('/') {
        return ChatInput::Question(line);
    }

    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match command {
        "/test-retriever" => ChatInput::TestRetriever(rest.trim()),
        "/history" => ChatInput::History,
        "/help" => ChatInput::Help,
        "/quit" | "/exit" => ChatInput::Quit,
        other => ChatInput::Unknown(other),
    }
}

pub async fn run(args: SourceArgs, config_path: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let agent = build_agent(&args, config_path.as_deref(), format).await?;

    let mut history = History::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stderr = tokio::io::stderr();

    if format == OutputFormat::Cli {
        eprintln!("{}", HELP);
    }

    loop {
        if format == OutputFormat::Cli {
            stderr.write_all(b"> ").await?;
            stderr.flush().await?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            ChatInput::Empty => continue,
            ChatInput::Quit => break,
            ChatInput::Help => eprintln!("{}", HELP),
            ChatInput::Unknown(command) => eprintln!("Unknown command {}. {}", command, HELP),
            ChatInput::History => print_history(&history),
            ChatInput::TestRetriever(query) => {
                if query.is_empty() {
                    eprintln!("Usage: /test-retriever <query>");
                    continue;
                }
                let fragments = agent.debug_retrieve(query).await;
                output::print_fragments(&fragments, format)?;
            }
            ChatInput::Question(query) => ask(&agent, query, &mut history, format).await?,
        }
    }

    Ok(())
}

async fn ask(agent: &Agent, query: &str, history: &mut History, format: OutputFormat) -> Result<()> {
    let outcome = agent.run_traced(query, history).await;
    tracing::info!(
        "Path: {:?}, {} tool failure(s)",
        outcome.trace,
        outcome.tool_failures.len()
    );
    output::print_outcome(&outcome, format)?;
    println!();
    Ok(())
}

fn print_history(history: &History) {
    if history.is_empty() {
        eprintln!("(no conversation yet)");
        return;
    }
    for turn in history.turns() {
        let speaker = match turn.role {
            Role::User => "you",
            Role::Agent => "agent",
        };
        let first_line = turn.text.lines().next().unwrap_or("");
        eprintln!(
            "{} {:>5}: {}",
            turn.timestamp.with_timezone(&chrono::Local).format("%H:%M:%S"),
            speaker,
            first_line
        );
    }
}

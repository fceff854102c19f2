//! Output formatters

pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use agentrag_core::{RunOutcome, TextFragment};
use std::io::{self, Write};
use termcolor::{ColorChoice, StandardStream};

/// Print the result of one question
pub fn print_outcome(outcome: &RunOutcome, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Json => io::stdout().write_all(json::format_outcome(outcome).as_bytes()),
        OutputFormat::Cli => {
            let mut out = StandardStream::stdout(ColorChoice::Auto);
            terminal::write_answer(&mut out, &outcome.answer)
        }
    }
}

/// Print raw retrieval results
pub fn print_fragments(fragments: &[TextFragment], format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Json => io::stdout().write_all(json::format_fragments(fragments).as_bytes()),
        OutputFormat::Cli => {
            let mut out = StandardStream::stdout(ColorChoice::Auto);
            terminal::write_fragments(&mut out, fragments)
        }
    }
}

// Ask a question about a pasted article using agentrag as a library.
//
// Needs a reachable OpenAI-compatible endpoint (see `agentrag config show`).

use agentrag_core::{Agent, Config, History, Ingestor, Source};

const ARTICLE: &str = "Task decomposition breaks a complicated task into smaller steps. \
Chain of thought prompting asks the model to think step by step, while tree of thoughts \
explores several reasoning possibilities at each step.";

#[tokio::main]
async fn main() -> agentrag_core::Result<()> {
    let config = Config::load()?;

    let ingestor = Ingestor::with_defaults(&config.ingest);
    let chunks = ingestor
        .chunk(&Source::text("task decomposition notes", ARTICLE))
        .await?;
    println!("Indexed {} chunk(s)", chunks.len());

    let agent = Agent::from_config(&config, chunks).await?;
    let mut history = History::new();

    for question in ["What is task decomposition?", "How does tree of thoughts differ?"] {
        let answer = agent.run(question, &mut history).await;
        println!("\nQ: {}\nA: {}", question, answer.text);
        println!("grounded: {}, sources: {:?}", answer.grounded, answer.cited_sources);
    }

    Ok(())
}

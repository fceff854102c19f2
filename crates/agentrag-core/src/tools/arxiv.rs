//! arXiv preprint search over the public Atom API

use super::{check_status, clean_snippet, send_error, SearchTool, ToolHit, ToolId};
use crate::error::{AgentRagError, Result};
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;

const ARXIV_QUERY_URL: &str = "http://export.arxiv.org/api/query";

/// Entry child whose text is being collected
#[derive(Debug, Clone, Copy)]
enum Field {
    Id,
    Title,
    Summary,
}

#[derive(Debug, Default)]
struct Entry {
    id: String,
    title: String,
    summary: String,
}

impl Entry {
    fn push(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Id => &mut self.id,
            Field::Title => &mut self.title,
            Field::Summary => &mut self.summary,
        };
        target.push_str(text);
    }

    /// The paper id is the tail of the abs URL
    fn into_hit(self, max_chars: usize) -> Option<ToolHit> {
        let id = self.id.trim();
        if id.is_empty() {
            return None;
        }
        let paper_id = id.rsplit("/abs/").next().unwrap_or(id).to_string();

        Some(ToolHit {
            text: format!(
                "Title: {}\nSummary: {}",
                clean_snippet(&self.title, usize::MAX),
                clean_snippet(&self.summary, max_chars)
            ),
            source_id: paper_id,
        })
    }
}

pub struct ArxivTool {
    client: Client,
    top_k: usize,
    max_chars: usize,
}

impl ArxivTool {
    pub fn new(client: Client, top_k: usize, max_chars: usize) -> Self {
        Self {
            client,
            top_k,
            max_chars,
        }
    }

    /// Entries of an Atom feed as hits, in feed order
    fn parse(feed: &str, max_chars: usize) -> Result<Vec<ToolHit>> {
        let mut reader = Reader::from_str(feed);
        let mut hits = Vec::new();
        let mut entry: Option<Entry> = None;
        let mut field: Option<Field> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(tag)) => match tag.local_name().as_ref() {
                    b"entry" => entry = Some(Entry::default()),
                    b"id" if entry.is_some() => field = Some(Field::Id),
                    b"title" if entry.is_some() => field = Some(Field::Title),
                    b"summary" if entry.is_some() => field = Some(Field::Summary),
                    _ => {}
                },
                Ok(Event::Text(text)) => {
                    if let (Some(entry), Some(field)) = (entry.as_mut(), field) {
                        let text = text.unescape().map_err(|e| feed_error(&reader, e))?;
                        entry.push(field, &text);
                    }
                }
                Ok(Event::CData(data)) => {
                    if let (Some(entry), Some(field)) = (entry.as_mut(), field) {
                        entry.push(field, &String::from_utf8_lossy(&data));
                    }
                }
                Ok(Event::End(tag)) => match tag.local_name().as_ref() {
                    b"entry" => {
                        if let Some(hit) = entry.take().and_then(|e| e.into_hit(max_chars)) {
                            hits.push(hit);
                        }
                        field = None;
                    }
                    b"id" | b"title" | b"summary" => field = None,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(feed_error(&reader, e)),
                _ => {}
            }
        }

        Ok(hits)
    }
}

fn feed_error(reader: &Reader<&[u8]>, e: quick_xml::Error) -> AgentRagError {
    AgentRagError::Tool {
        tool: ToolId::AcademicPreprint.name().to_string(),
        message: format!("unreadable feed at byte {}: {}", reader.buffer_position(), e),
    }
}

#[async_trait]
impl SearchTool for ArxivTool {
    fn id(&self) -> ToolId {
        ToolId::AcademicPreprint
    }

    async fn search(&self, query: &str) -> Result<Vec<ToolHit>> {
        let search_query = format!("all:{}", query);
        let max_results = self.top_k.to_string();
        let response = self
            .client
            .get(ARXIV_QUERY_URL)
            .query(&[
                ("search_query", search_query.as_str()),
                ("max_results", max_results.as_str()),
            ])
            .send()
            .await
            .map_err(|e| send_error(self.id(), e))?;
        let feed = check_status(self.id(), response)?
            .text()
            .await
            .map_err(|e| send_error(self.id(), e))?;

        let hits = Self::parse(&feed, self.max_chars)?;
        tracing::debug!("arxiv returned {} entries for {:?}", hits.len(), query);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=all:agents</title>
  <id>http://arxiv.org/api/cHxbiOdZaP56ODnBPIenZhzg5f8</id>
  <entry>
    <id>http://arxiv.org/abs/2210.03629v3</id>
    <title>ReAct: Synergizing Reasoning and
      Acting in Language Models</title>
    <summary>  While large language models have demonstrated
      impressive capabilities...  </summary>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2303.11366v4</id>
    <title>Reflexion</title>
    <summary>Language agents with verbal reinforcement learning.</summary>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed_entries() {
        let hits = ArxivTool::parse(FEED, 1000).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source_id, "2210.03629v3");
        assert!(hits[0]
            .text
            .starts_with("Title: ReAct: Synergizing Reasoning and Acting in Language Models"));
        assert!(hits[0]
            .text
            .contains("Summary: While large language models have demonstrated impressive"));
        assert_eq!(hits[1].source_id, "2303.11366v4");
    }

    #[test]
    fn test_summary_truncated() {
        let hits = ArxivTool::parse(FEED, 10).unwrap();
        assert!(hits[0].text.ends_with("Summary: While larg..."));
    }

    #[test]
    fn test_feed_without_entries() {
        let feed = r#"<feed><title>ArXiv Query</title><id>x</id></feed>"#;
        assert!(ArxivTool::parse(feed, 1000).unwrap().is_empty());
    }

    #[test]
    fn test_entities_are_decoded() {
        let feed = r#"<feed><entry>
    <id>http://arxiv.org/abs/2401.00001v1</id>
    <title>Tools &amp; Agents: &#8220;Plan&#8221; first</title>
    <summary>Uses &lt;tags&gt; carefully.</summary>
  </entry></feed>"#;
        let hits = ArxivTool::parse(feed, 1000).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0]
            .text
            .starts_with("Title: Tools & Agents: \u{201c}Plan\u{201d} first"));
        assert!(hits[0].text.ends_with("Summary: Uses <tags> carefully."));
    }

    #[test]
    fn test_entry_without_id_is_skipped() {
        let feed = "<feed><entry><title>No id</title></entry></feed>";
        assert!(ArxivTool::parse(feed, 1000).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_feed_is_a_tool_error() {
        let feed = "<feed><entry><id>x</title></entry></feed>";
        let err = ArxivTool::parse(feed, 1000).unwrap_err();
        assert!(matches!(err, AgentRagError::Tool { .. }));
    }
}

//! Wikipedia encyclopedia lookup via the MediaWiki action API

use super::{check_status, send_error, SearchTool, ToolHit, ToolId};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize)]
struct ApiResponse {
    query: Option<QueryBlock>,
}

#[derive(Deserialize)]
struct QueryBlock {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: String,
    /// Search rank of the page
    #[serde(default)]
    index: u32,
}

pub struct WikipediaTool {
    client: Client,
    lang: String,
    top_k: usize,
}

impl WikipediaTool {
    pub fn new(client: Client, lang: &str, top_k: usize) -> Self {
        let lang = lang.trim();
        Self {
            client,
            lang: if lang.is_empty() { "en".into() } else { lang.to_string() },
            top_k,
        }
    }

    fn endpoint(&self) -> String {
        format!("https://{}.wikipedia.org/w/api.php", self.lang)
    }

    fn parse(body: &str) -> Result<Vec<ToolHit>> {
        let response: ApiResponse = serde_json::from_str(body)?;
        let Some(query) = response.query else {
            // No search matches
            return Ok(Vec::new());
        };

        let mut pages: Vec<Page> = query.pages.into_values().collect();
        pages.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.title.cmp(&b.title)));

        Ok(pages
            .into_iter()
            .map(|p| ToolHit {
                text: format!("{}: {}", p.title, p.extract.trim()),
                source_id: p.title,
            })
            .filter(|hit| !hit.text.ends_with(": "))
            .collect())
    }
}

#[async_trait]
impl SearchTool for WikipediaTool {
    fn id(&self) -> ToolId {
        ToolId::Encyclopedia
    }

    async fn search(&self, query: &str) -> Result<Vec<ToolHit>> {
        let limit = self.top_k.to_string();
        let response = self
            .client
            .get(self.endpoint())
            .query(&[
                ("action", "query"),
                ("generator", "search"),
                ("gsrsearch", query),
                ("gsrlimit", limit.as_str()),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exlimit", limit.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| send_error(self.id(), e))?;
        let body = check_status(self.id(), response)?
            .text()
            .await
            .map_err(|e| send_error(self.id(), e))?;

        let hits = Self::parse(&body)?;
        tracing::debug!("wikipedia returned {} pages for {:?}", hits.len(), query);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_orders_by_search_rank() {
        let body = r#"{
            "batchcomplete": "",
            "query": {
                "pages": {
                    "5843419": {"pageid": 5843419, "ns": 0, "title": "France", "index": 2,
                                "extract": "France is a country in Western Europe."},
                    "22989": {"pageid": 22989, "ns": 0, "title": "Paris", "index": 1,
                              "extract": "Paris is the capital and largest city of France."}
                }
            }
        }"#;

        let hits = WikipediaTool::parse(body).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source_id, "Paris");
        assert!(hits[0].text.starts_with("Paris: Paris is the capital"));
        assert_eq!(hits[1].source_id, "France");
    }

    #[test]
    fn test_parse_no_matches() {
        assert!(WikipediaTool::parse(r#"{"batchcomplete": ""}"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_parse_drops_empty_extracts() {
        let body = r#"{"query": {"pages": {"1": {"title": "Stub", "index": 1, "extract": "  "}}}}"#;
        assert!(WikipediaTool::parse(body).unwrap().is_empty());
    }

    #[test]
    fn test_language_edition() {
        let tool = WikipediaTool::new(Client::new(), "fr", 3);
        assert_eq!(tool.endpoint(), "https://fr.wikipedia.org/w/api.php");
        let tool = WikipediaTool::new(Client::new(), " ", 3);
        assert_eq!(tool.endpoint(), "https://en.wikipedia.org/w/api.php");
    }
}

//! Tavily general web search

use super::{check_status, send_error, SearchTool, ToolHit, ToolId};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

pub struct TavilyTool {
    client: Client,
    api_key: String,
    max_results: usize,
    endpoint: String,
}

impl TavilyTool {
    pub fn new(client: Client, api_key: String, max_results: usize) -> Self {
        Self {
            client,
            api_key,
            max_results,
            endpoint: TAVILY_SEARCH_URL.to_string(),
        }
    }

    /// Point at a different search endpoint (proxy, self-hosted mirror)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn parse(body: &str) -> Result<Vec<ToolHit>> {
        let response: SearchResponse = serde_json::from_str(body)?;
        Ok(response
            .results
            .into_iter()
            .map(|r| {
                let text = if r.title.is_empty() {
                    r.content
                } else {
                    format!("{}: {}", r.title, r.content)
                };
                ToolHit {
                    text: text.trim().to_string(),
                    source_id: r.url,
                }
            })
            .collect())
    }
}

#[async_trait]
impl SearchTool for TavilyTool {
    fn id(&self) -> ToolId {
        ToolId::GeneralWebSearch
    }

    async fn search(&self, query: &str) -> Result<Vec<ToolHit>> {
        let request = SearchRequest {
            api_key: &self.api_key,
            query,
            max_results: self.max_results,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(self.id(), e))?;
        let body = check_status(self.id(), response)?
            .text()
            .await
            .map_err(|e| send_error(self.id(), e))?;

        let hits = Self::parse(&body)?;
        tracing::debug!("tavily returned {} results for {:?}", hits.len(), query);
        Ok(hits)
    }
}

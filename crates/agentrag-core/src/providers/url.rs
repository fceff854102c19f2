//! URL Provider for fetching web pages and remote PDFs

use crate::error::{AgentRagError, Result};
use crate::providers::{Source, SourceItem, SourceProvider};
use async_trait::async_trait;
use html2text::render::text_renderer::TrivialDecorator;
use lazy_static::lazy_static;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::time::Duration;

/// Wide enough that paragraphs are not hard-wrapped
const WRAP_WIDTH: usize = 1000;

lazy_static! {
    static ref NON_CONTENT: Selector =
        Selector::parse("head, script, style, noscript, template, svg, nav, footer, iframe")
            .unwrap();
    static ref TITLE: Selector = Selector::parse("title").unwrap();
}

/// Body of a fetched URL, before text extraction
enum Fetched {
    Text { body: String, is_html: bool },
    Pdf(Vec<u8>),
}

/// Provider for fetching content from URLs
pub struct URLProvider {
    client: Client,
}

impl Default for URLProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl URLProvider {
    /// Create a new URLProvider with default settings
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(concat!("agentrag/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    /// Create a URLProvider with custom client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_url(&self, url: &str) -> Result<Fetched> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AgentRagError::Timeout(format!("fetching {}", url))
            } else if e.is_connect() {
                AgentRagError::ExternalError(format!(
                    "Connection error fetching {}: cannot reach server",
                    url
                ))
            } else {
                AgentRagError::ExternalError(format!("Failed to fetch URL {}: {}", url, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_msg = match status {
                StatusCode::NOT_FOUND => format!("URL not found (404): {}", url),
                StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                    format!("Access denied ({}): {}", status.as_u16(), url)
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    return Err(AgentRagError::RateLimited(url.to_string()));
                }
                s if s.is_server_error() => format!("Server error ({}): {}", s.as_u16(), url),
                _ => format!(
                    "HTTP error {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown error")
                ),
            };
            return Err(AgentRagError::ExternalError(error_msg));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        let read_err = |e: reqwest::Error| {
            AgentRagError::ExternalError(format!("Failed to read response body from {}: {}", url, e))
        };

        if content_type.contains("application/pdf") || url.to_ascii_lowercase().ends_with(".pdf") {
            let bytes = response.bytes().await.map_err(read_err)?;
            return Ok(Fetched::Pdf(bytes.to_vec()));
        }

        let body = response.text().await.map_err(read_err)?;
        let is_html = content_type.contains("html") || looks_like_html(&body);
        Ok(Fetched::Text { body, is_html })
    }

    /// Extract title from content (HTML title, markdown # header, or URL tail)
    fn extract_title(&self, content: &str, url: &str) -> String {
        if looks_like_html(content) || content.contains("<title") {
            let document = Html::parse_document(content);
            if let Some(element) = document.select(&TITLE).next() {
                let title = element.text().collect::<String>();
                let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
                if !title.is_empty() {
                    return title;
                }
            }
        }

        if let Some(title) = content.lines().find(|line| line.trim().starts_with("# ")) {
            return title.trim().trim_start_matches("# ").trim().to_string();
        }

        url.split('/')
            .filter(|s| !s.is_empty())
            .next_back()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    async fn load_url(&self, url: &str) -> Result<SourceItem> {
        let (title, content) = match self.fetch_url(url).await? {
            Fetched::Pdf(bytes) => {
                let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
                    AgentRagError::Parse(format!("Failed to extract text from PDF {}: {}", url, e))
                })?;
                (self.extract_title("", url), text)
            }
            Fetched::Text { body, is_html } => {
                let title = self.extract_title(&body, url);
                let text = if is_html { html_to_text(&body) } else { body };
                (title, text)
            }
        };

        if content.trim().is_empty() {
            return Err(AgentRagError::Parse(format!(
                "No readable text at {}",
                url
            )));
        }

        Ok(SourceItem::new(url.to_string(), title, content, "url").with_metadata("url", url))
    }
}

fn looks_like_html(body: &str) -> bool {
    let head: String = body.trim_start().chars().take(256).collect::<String>().to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html") || head.contains("<body")
}

/// Readable text of an HTML page, one block per line.
///
/// Page chrome (head, scripts, navigation, footers) is removed before
/// rendering; entities are decoded by the HTML parser.
pub fn html_to_text(html: &str) -> String {
    let mut document = Html::parse_document(html);
    let hidden: Vec<_> = document.select(&NON_CONTENT).map(|element| element.id()).collect();
    for id in hidden {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    let cleaned = document.html();
    let rendered =
        html2text::from_read_with_decorator(cleaned.as_bytes(), WRAP_WIDTH, TrivialDecorator::new());

    collapse_blank_lines(&rendered)
}

/// Trim every line and keep at most one blank line between blocks
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_blank = false;

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if !out.is_empty() {
            out.push_str(if pending_blank { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        pending_blank = false;
    }

    out
}

#[async_trait]
impl SourceProvider for URLProvider {
    fn provider_type(&self) -> &'static str {
        "url"
    }

    async fn load(&self, source: &Source) -> Result<Vec<SourceItem>> {
        let Source::Url(url) = source else {
            return Err(AgentRagError::InvalidInput(format!(
                "url provider cannot load {}",
                source.label()
            )));
        };

        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AgentRagError::InvalidInput(format!(
                "Not an http(s) URL: {}",
                url
            )));
        }

        Ok(vec![self.load_url(url).await?])
    }
}

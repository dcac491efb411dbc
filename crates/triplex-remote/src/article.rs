//! Wikipedia article source
//!
//! Fetches the plain-text extract of a page through the MediaWiki Action
//! API. Missing pages and disambiguation pages are reported as errors so
//! they never reach the annotation pipeline.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use triplex_core::{ArticleConfig, ArticleSource, Result, TriplexError};

/// MediaWiki plain-text article client
pub struct WikipediaClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<QueryResult>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    extract: Option<String>,
    pageprops: Option<PageProps>,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    disambiguation: Option<serde_json::Value>,
}

impl WikipediaClient {
    /// Create a new client for a MediaWiki site, e.g. `https://en.wikipedia.org`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create from config
    pub fn from_config(config: &ArticleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TriplexError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.wikipedia_url.clone(),
        })
    }
}

/// Pull the article text out of a query response
fn article_text(requested: &str, response: QueryResponse) -> Result<String> {
    let page = response
        .query
        .and_then(|q| q.pages.into_iter().next())
        .ok_or_else(|| TriplexError::NotFound(requested.to_string()))?;

    if page.missing || page.invalid {
        return Err(TriplexError::NotFound(page.title));
    }
    if page
        .pageprops
        .as_ref()
        .is_some_and(|p| p.disambiguation.is_some())
    {
        return Err(TriplexError::ArticleError(format!(
            "'{}' is a disambiguation page",
            page.title
        )));
    }

    page.extract
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| TriplexError::ArticleError(format!("'{}' has no text", page.title)))
}

#[async_trait]
impl ArticleSource for WikipediaClient {
    async fn fetch(&self, title: &str) -> Result<String> {
        let url = format!("{}/w/api.php", self.base_url.trim_end_matches('/'));
        debug!(title, url = %url, "fetching article");

        let response = self
            .client
            .get(url)
            .query(&[
                ("action", "query"),
                ("prop", "extracts|pageprops"),
                ("ppprop", "disambiguation"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("format", "json"),
                ("formatversion", "2"),
                ("titles", title),
            ])
            .send()
            .await
            .map_err(|e| TriplexError::ArticleError(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(TriplexError::ArticleError(format!(
                "Wikipedia returned {status}"
            )));
        }

        let result: QueryResponse = response
            .json()
            .await
            .map_err(|e| TriplexError::ArticleError(format!("Failed to parse response: {e}")))?;

        article_text(title, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> QueryResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_article_text() {
        let response = parse(json!({
            "batchcomplete": true,
            "query": {"pages": [{"pageid": 1, "title": "Brad Pitt", "extract": "William Bradley Pitt is an American actor."}]}
        }));
        assert_eq!(
            article_text("Bradley Pitt", response).unwrap(),
            "William Bradley Pitt is an American actor."
        );
    }

    #[test]
    fn test_missing_page() {
        let response = parse(json!({
            "query": {"pages": [{"title": "No Such Person", "missing": true}]}
        }));
        assert!(matches!(
            article_text("No Such Person", response),
            Err(TriplexError::NotFound(title)) if title == "No Such Person"
        ));
    }

    #[test]
    fn test_disambiguation_page() {
        let response = parse(json!({
            "query": {"pages": [{
                "title": "Mercury",
                "extract": "Mercury may refer to:",
                "pageprops": {"disambiguation": ""}
            }]}
        }));
        assert!(matches!(
            article_text("Mercury", response),
            Err(TriplexError::ArticleError(_))
        ));
    }

    #[test]
    fn test_empty_query() {
        let response = parse(json!({"batchcomplete": true}));
        assert!(matches!(
            article_text("Anything", response),
            Err(TriplexError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_over_http() {
        let body = json!({
            "query": {"pages": [{"title": "J. K. Rowling", "extract": "Joanne Rowling is a British author."}]}
        })
        .to_string();
        let (base_url, request) = serve_once(200, body).await;

        let client = WikipediaClient::new(base_url);
        let text = client.fetch("J.K. Rowling").await.unwrap();
        assert_eq!(text, "Joanne Rowling is a British author.");

        let request = request.await.unwrap();
        assert!(request.starts_with("GET /w/api.php?"));
        assert!(
            request.contains("titles=J.K.+Rowling") || request.contains("titles=J.K.%20Rowling")
        );
        assert!(request.contains("explaintext=1"));
    }

    #[tokio::test]
    async fn test_fetch_server_error() {
        let (base_url, _request) = serve_once(503, String::new()).await;
        let client = WikipediaClient::new(base_url);
        assert!(matches!(
            client.fetch("Donald Trump").await,
            Err(TriplexError::ArticleError(_))
        ));
    }
}

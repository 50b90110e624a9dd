use super::{Capability, Tool};
use crate::{
    error::{ResearchError, Result},
    schemas::validator::{parameters_schema_for, parse_params},
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, pin::Pin, str::FromStr, sync::Arc, time::Duration};
use tracing::{debug, info};

const DUCKDUCKGO_ENDPOINT: &str = "https://api.duckduckgo.com/";
const STRACT_ENDPOINT: &str = "https://stract.com/beta/api/search";

/// Search API the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchBackend {
    /// `GET ?q=<query>&format=json`, URLs from `Results[].FirstURL`
    #[default]
    DuckDuckGo,
    /// `POST {"query": <query>}`, URLs from `webpages[].url`
    Stract,
}

impl SearchBackend {
    pub fn default_endpoint(self) -> &'static str {
        match self {
            SearchBackend::DuckDuckGo => DUCKDUCKGO_ENDPOINT,
            SearchBackend::Stract => STRACT_ENDPOINT,
        }
    }
}

impl FromStr for SearchBackend {
    type Err = ResearchError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "duckduckgo" | "ddg" => Ok(SearchBackend::DuckDuckGo),
            "stract" => Ok(SearchBackend::Stract),
            other => Err(ResearchError::Config(format!(
                "Unknown search backend '{}', expected 'duckduckgo' or 'stract'",
                other
            ))),
        }
    }
}

impl fmt::Display for SearchBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchBackend::DuckDuckGo => f.write_str("duckduckgo"),
            SearchBackend::Stract => f.write_str("stract"),
        }
    }
}

/// URLs found for one query
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub query: String,
    pub urls: Vec<String>,
    /// Unparsed backend response, kept for backends that return more than links
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// HTTP client for the configured search backend
#[derive(Debug, Clone)]
pub struct WebSearchClient {
    client: Client,
    backend: SearchBackend,
    endpoint: String,
    max_results: usize,
}

impl WebSearchClient {
    pub fn new(backend: SearchBackend) -> Self {
        Self {
            client: Client::new(),
            backend,
            endpoint: backend.default_endpoint().to_string(),
            max_results: crate::config::DEFAULT_MAX_SEARCH_RESULTS,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder().timeout(timeout).build().map_err(|err| {
            ResearchError::Config(format!("Failed to build search HTTP client: {err}"))
        })?;
        Ok(self)
    }

    pub fn backend(&self) -> SearchBackend {
        self.backend
    }

    pub async fn search(&self, query: &str) -> Result<SearchResult> {
        info!(backend = %self.backend, "Searching the web for: {}", query);

        let request = match self.backend {
            SearchBackend::DuckDuckGo => self
                .client
                .get(&self.endpoint)
                .query(&[("q", query), ("format", "json")]),
            SearchBackend::Stract => self
                .client
                .post(&self.endpoint)
                .header("accept", "application/json")
                .json(&serde_json::json!({ "query": query })),
        };

        let response = request
            .send()
            .await
            .map_err(|err| ResearchError::Search(format!("Search request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResearchError::Search(format!(
                "Search endpoint returned status {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|err| ResearchError::Search(format!("Failed to read search response: {err}")))?;

        let raw: Value = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).map_err(|err| {
                ResearchError::Search(format!("Search response was not JSON: {err}"))
            })?
        };

        let urls = match self.backend {
            SearchBackend::DuckDuckGo => parse_duckduckgo_urls(&raw, self.max_results),
            SearchBackend::Stract => parse_stract_urls(&raw, self.max_results),
        };
        debug!(count = urls.len(), "search returned urls");

        Ok(SearchResult {
            query: query.to_string(),
            urls,
            raw: match self.backend {
                SearchBackend::Stract => Some(raw),
                SearchBackend::DuckDuckGo => None,
            },
        })
    }
}

fn parse_duckduckgo_urls(raw: &Value, max_results: usize) -> Vec<String> {
    collect_urls(raw.get("Results"), "FirstURL", max_results)
}

fn parse_stract_urls(raw: &Value, max_results: usize) -> Vec<String> {
    collect_urls(raw.get("webpages"), "url", max_results)
}

fn collect_urls(results: Option<&Value>, key: &str, max_results: usize) -> Vec<String> {
    results
        .and_then(|value| value.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get(key).and_then(|url| url.as_str()))
                .filter(|url| !url.is_empty())
                .take(max_results)
                .map(|url| url.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Parameters accepted by the search tool
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchWebParams {
    /// The search query to find relevant web pages
    pub query: String,
}

/// Tool exposing [`WebSearchClient`] to the planner
#[derive(Debug, Clone)]
pub struct SearchWebTool {
    client: Arc<WebSearchClient>,
}

impl SearchWebTool {
    pub fn new(client: Arc<WebSearchClient>) -> Self {
        Self { client }
    }
}

impl Tool for SearchWebTool {
    fn capability(&self) -> Capability {
        Capability::SearchWeb
    }

    fn parameters_schema(&self) -> Value {
        parameters_schema_for::<SearchWebParams>()
    }

    fn execute(
        &self,
        parameters: Value,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Value>> + Send + '_>> {
        Box::pin(async move {
            let params: SearchWebParams = parse_params(self.capability(), parameters)?;
            let result = self.client.search(&params.query).await?;

            Ok(match result.raw {
                Some(raw) => serde_json::json!({ "urls": result.urls, "raw": raw }),
                None => serde_json::json!(result.urls),
            })
        })
    }
}

use crate::error::{ResearchError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const ARXIV_ENDPOINT: &str = "http://export.arxiv.org/api/query";

/// One arXiv paper, whitespace in title and abstract collapsed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Paper {
    pub title: String,
    pub summary: String,
    pub authors: Vec<String>,
    /// Entry id, the paper's `abs` page
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: String,
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(rename = "author", default)]
    authors: Vec<AtomAuthor>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    name: String,
}

/// Client for the arXiv Atom query API, newest submissions first
#[derive(Debug, Clone)]
pub struct ArxivClient {
    client: Client,
    endpoint: String,
    max_results: usize,
}

impl Default for ArxivClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ArxivClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            endpoint: ARXIV_ENDPOINT.to_string(),
            max_results: crate::config::DEFAULT_MAX_PAPERS,
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
            ResearchError::Config(format!("Failed to build arXiv HTTP client: {err}"))
        })?;
        Ok(self)
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub async fn fetch_papers(&self, query: &str) -> Result<Vec<Paper>> {
        info!("Fetching papers on: {}", query);
        let max_results = self.max_results.to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("search_query", query),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
            ])
            .send()
            .await
            .map_err(|err| ResearchError::Search(format!("arXiv request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResearchError::Search(format!(
                "arXiv returned status {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|err| ResearchError::Search(format!("Failed to read arXiv response: {err}")))?;

        let papers = parse_feed(&body)?;
        debug!(count = papers.len(), "arXiv returned papers");
        Ok(papers.into_iter().take(self.max_results).collect())
    }
}

/// Papers listed in an arXiv Atom feed, in feed order
pub fn parse_feed(xml: &str) -> Result<Vec<Paper>> {
    let feed: AtomFeed = quick_xml::de::from_str(xml).map_err(|err| {
        ResearchError::Search(format!("arXiv response was not a valid Atom feed: {err}"))
    })?;

    Ok(feed
        .entries
        .into_iter()
        .map(|entry| Paper {
            title: collapse_whitespace(&entry.title),
            summary: collapse_whitespace(&entry.summary),
            authors: entry
                .authors
                .into_iter()
                .map(|author| collapse_whitespace(&author.name))
                .collect(),
            url: entry.id.trim().to_string(),
        })
        .collect())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=quantum</title>
  <id>http://arxiv.org/api/abc</id>
  <entry>
    <id>http://arxiv.org/abs/2401.00001v1</id>
    <published>2024-01-01T00:00:00Z</published>
    <title>Surface Codes
      at Scale</title>
    <summary>  We show logical qubits
  below threshold. </summary>
    <author><name>Alice Smith</name></author>
    <author><name>Bob Jones</name></author>
    <link href="http://arxiv.org/abs/2401.00001v1" rel="alternate" type="text/html"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2401.00002v1</id>
    <title>Second Paper</title>
    <summary>Short.</summary>
    <author><name>Carol White</name></author>
  </entry>
</feed>"#;

    #[test]
    fn parses_entries_and_collapses_whitespace() {
        let papers = parse_feed(FEED).unwrap();
        assert_eq!(papers.len(), 2);
        assert_eq!(papers[0].title, "Surface Codes at Scale");
        assert_eq!(papers[0].summary, "We show logical qubits below threshold.");
        assert_eq!(papers[0].authors, vec!["Alice Smith", "Bob Jones"]);
        assert_eq!(papers[0].url, "http://arxiv.org/abs/2401.00001v1");
        assert_eq!(papers[1].authors, vec!["Carol White"]);
    }

    #[test]
    fn feed_without_entries_is_empty() {
        let feed = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>none</title></feed>"#;
        assert!(parse_feed(feed).unwrap().is_empty());
    }

    #[test]
    fn malformed_feed_is_a_search_error() {
        assert!(matches!(
            parse_feed("<feed><entry><id>x</feed>"),
            Err(ResearchError::Search(_))
        ));
    }
}

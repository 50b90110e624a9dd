//! Fixed research sequences that run without a planner: web search → extract
//! → store → summarize, and arXiv fetch → store → summarize.

use crate::{
    core::Kernel,
    error::Result,
    tools::{save_memory::research_description, ArxivClient, Capability, Paper},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use tracing::{info, warn};

/// What one pipeline run did
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub topic: String,
    pub urls: Vec<String>,
    /// Memory ids of the saved documents
    pub saved: Vec<String>,
    /// `(url, reason)` for every page that could not be extracted
    pub failures: Vec<(String, String)>,
    pub summary: String,
}

/// Runs the research steps in a fixed order against a kernel
#[derive(Debug, Clone, Copy)]
pub struct ResearchPipeline<'a> {
    kernel: &'a Kernel,
}

impl<'a> ResearchPipeline<'a> {
    pub fn new(kernel: &'a Kernel) -> Self {
        Self { kernel }
    }

    /// Research `topic`. Search failures end the run; a page that cannot be
    /// extracted is recorded in the report and skipped.
    pub async fn run(&self, topic: &str) -> Result<PipelineReport> {
        let topic = topic.trim();
        info!("Searching for: {}", topic);
        let search = self.kernel.web_search().search(topic).await?;

        let mut saved = Vec::new();
        let mut failures = Vec::new();

        for url in &search.urls {
            let document = match self.kernel.extractor().extract(url).await {
                Ok(document) => document,
                Err(err) => {
                    warn!(url = %url, "skipping page: {}", err);
                    failures.push((url.clone(), err.to_string()));
                    continue;
                }
            };

            if document.text.is_empty() {
                failures.push((url.clone(), "page contained no text".to_string()));
                continue;
            }

            let mut metadata = HashMap::new();
            metadata.insert("topic".to_string(), topic.to_string());
            metadata.insert("url".to_string(), document.url.clone());

            let id = self
                .kernel
                .memory()
                .save_information(
                    self.kernel.collection(),
                    &document.text,
                    &research_description(topic),
                    metadata,
                )
                .await?;
            saved.push(id);
        }

        info!(saved = saved.len(), failed = failures.len(), "Generating research summary");
        let summary = self
            .kernel
            .invoke(Capability::CreateSummary, json!({ "topic": topic }))
            .await?;

        Ok(PipelineReport {
            topic: topic.to_string(),
            urls: search.urls,
            saved,
            failures,
            summary: match summary {
                serde_json::Value::String(text) => text,
                other => other.to_string(),
            },
        })
    }
}

/// What one arXiv run did
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArxivReport {
    pub topic: String,
    pub papers: Vec<Paper>,
    /// Memory ids of the stored abstracts
    pub saved: Vec<String>,
    pub summary: String,
}

/// Fetches recent arXiv papers, stores their abstracts and summarizes them
#[derive(Debug, Clone)]
pub struct ArxivPipeline<'a> {
    kernel: &'a Kernel,
    client: &'a ArxivClient,
    collection: String,
}

impl<'a> ArxivPipeline<'a> {
    pub fn new(kernel: &'a Kernel, client: &'a ArxivClient) -> Self {
        Self {
            kernel,
            client,
            collection: crate::config::DEFAULT_PAPER_COLLECTION.to_string(),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Abstracts are stored with the paper title as description and
    /// `authors` / `url` metadata; the summary is written from the papers
    /// memory recalls for `topic`.
    pub async fn run(&self, topic: &str) -> Result<ArxivReport> {
        let topic = topic.trim();
        let papers = self.client.fetch_papers(topic).await?;

        info!("Storing {} papers in memory", papers.len());
        let mut saved = Vec::with_capacity(papers.len());
        for paper in &papers {
            let mut metadata = HashMap::new();
            metadata.insert("authors".to_string(), paper.authors.join(", "));
            metadata.insert("url".to_string(), paper.url.clone());

            let id = self
                .kernel
                .memory()
                .save_information(&self.collection, &paper.summary, &paper.title, metadata)
                .await?;
            saved.push(id);
        }

        let recalled = self
            .kernel
            .memory()
            .search(&self.collection, topic, self.kernel.settings().recall_limit)
            .await?;
        let papers_text = recalled
            .iter()
            .map(|paper| format!("Title: {}\nAbstract: {}", paper.description, paper.text))
            .collect::<Vec<_>>()
            .join("\n\n");

        info!("Generating research summary");
        let summary = self
            .kernel
            .invoke(
                Capability::SummarizeResearch,
                json!({ "topic": topic, "papers": papers_text }),
            )
            .await?;

        Ok(ArxivReport {
            topic: topic.to_string(),
            papers,
            saved,
            summary: match summary {
                serde_json::Value::String(text) => text,
                other => other.to_string(),
            },
        })
    }
}

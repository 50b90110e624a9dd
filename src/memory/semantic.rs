use super::{
    embeddings::EmbeddingGenerator,
    store::{MemoryRecord, MemoryStore},
};
use crate::error::{ResearchError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use tracing::info;

/// One hit from a memory search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryQueryResult {
    pub id: String,
    pub text: String,
    pub description: String,
    pub additional_metadata: HashMap<String, String>,
    pub relevance: f32,
}

/// What the research tools need from a memory: save text, find it again
#[async_trait]
pub trait SemanticMemory: Send + Sync + std::fmt::Debug {
    /// Store `text` in `collection` and return the new record id
    async fn save_information(
        &self,
        collection: &str,
        text: &str,
        description: &str,
        additional_metadata: HashMap<String, String>,
    ) -> Result<String>;

    /// Up to `limit` records most similar to `query`, best first
    async fn search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryQueryResult>>;
}

/// Semantic memory built from an embedding generator and a record store
#[derive(Debug)]
pub struct SemanticTextMemory {
    store: Arc<dyn MemoryStore>,
    embeddings: Arc<dyn EmbeddingGenerator>,
    min_relevance_score: f32,
    next_id: AtomicU64,
}

impl SemanticTextMemory {
    pub fn new(store: Arc<dyn MemoryStore>, embeddings: Arc<dyn EmbeddingGenerator>) -> Self {
        Self {
            store,
            embeddings,
            min_relevance_score: 0.0,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_min_relevance_score(mut self, score: f32) -> Self {
        self.min_relevance_score = score;
        self
    }

    pub fn store(&self) -> &Arc<dyn MemoryStore> {
        &self.store
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embeddings
            .generate_embeddings(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ResearchError::Memory("Embedding generator returned nothing".to_string()))
    }
}

#[async_trait]
impl SemanticMemory for SemanticTextMemory {
    async fn save_information(
        &self,
        collection: &str,
        text: &str,
        description: &str,
        additional_metadata: HashMap<String, String>,
    ) -> Result<String> {
        if collection.trim().is_empty() {
            return Err(ResearchError::Memory(
                "Collection name must not be empty".to_string(),
            ));
        }

        let embedding = self.embed_one(text).await?;
        let id = format!(
            "{}-{}",
            collection,
            self.next_id.fetch_add(1, Ordering::Relaxed)
        );

        let record = MemoryRecord {
            id,
            text: text.to_string(),
            description: description.to_string(),
            additional_metadata,
            embedding,
        };

        let id = self.store.upsert(collection, record).await?;
        info!(collection, id = %id, "saved information to memory");
        Ok(id)
    }

    async fn search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryQueryResult>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let embedding = self.embed_one(query).await?;
        let matches = self
            .store
            .get_nearest_matches(collection, &embedding, limit, self.min_relevance_score)
            .await?;

        Ok(matches
            .into_iter()
            .map(|(record, relevance)| MemoryQueryResult {
                id: record.id,
                text: record.text,
                description: record.description,
                additional_metadata: record.additional_metadata,
                relevance,
            })
            .collect())
    }
}

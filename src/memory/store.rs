use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One saved snippet and its embedding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    pub id: String,
    pub text: String,
    pub description: String,
    #[serde(default)]
    pub additional_metadata: HashMap<String, String>,
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

/// Storage for embedded records, partitioned by collection
#[async_trait]
pub trait MemoryStore: Send + Sync + std::fmt::Debug {
    async fn upsert(&self, collection: &str, record: MemoryRecord) -> Result<String>;

    /// Records closest to `embedding`, best first, with their relevance score
    async fn get_nearest_matches(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        min_relevance_score: f32,
    ) -> Result<Vec<(MemoryRecord, f32)>>;

    async fn collections(&self) -> Result<Vec<String>>;
}

/// Cosine similarity of two vectors; zero when either is empty, zero-length,
/// or the dimensions differ
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

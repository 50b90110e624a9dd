use crate::error::Result;
use async_trait::async_trait;

/// Turns text into embedding vectors
#[async_trait]
pub trait EmbeddingGenerator: Send + Sync + std::fmt::Debug {
    /// One vector per input, in input order
    async fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

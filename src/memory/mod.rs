//! Semantic memory: embeddings plus a similarity-searchable record store

pub mod embeddings;
pub mod semantic;
pub mod store;
pub mod volatile;

pub use embeddings::EmbeddingGenerator;
pub use semantic::{MemoryQueryResult, SemanticMemory, SemanticTextMemory};
pub use store::{cosine_similarity, MemoryRecord, MemoryStore};
pub use volatile::VolatileMemoryStore;

use super::store::{cosine_similarity, MemoryRecord, MemoryStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// In-process memory store; contents live as long as the process.
///
/// Collections are created on first write. Upserting a record whose id
/// already exists in the collection replaces it.
#[derive(Debug, Default)]
pub struct VolatileMemoryStore {
    collections: RwLock<HashMap<String, Vec<MemoryRecord>>>,
}

impl VolatileMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|records| records.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl MemoryStore for VolatileMemoryStore {
    async fn upsert(&self, collection: &str, record: MemoryRecord) -> Result<String> {
        let mut collections = self.collections.write().await;
        let records = collections.entry(collection.to_string()).or_default();
        let id = record.id.clone();

        match records.iter_mut().find(|existing| existing.id == id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        debug!(collection, id = %id, "memory record stored");
        Ok(id)
    }

    async fn get_nearest_matches(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        min_relevance_score: f32,
    ) -> Result<Vec<(MemoryRecord, f32)>> {
        let collections = self.collections.read().await;
        let Some(records) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<(MemoryRecord, f32)> = records
            .iter()
            .map(|record| (record, cosine_similarity(&record.embedding, embedding)))
            .filter(|(_, score)| *score >= min_relevance_score)
            .map(|(record, score)| (record.clone(), score))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn collections(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, embedding: Vec<f32>) -> MemoryRecord {
        MemoryRecord {
            id: id.to_string(),
            text: format!("text {id}"),
            description: String::new(),
            additional_metadata: HashMap::new(),
            embedding,
        }
    }

    #[test]
    fn nearest_matches_are_ranked_and_limited() {
        let store = VolatileMemoryStore::new();
        tokio_test::block_on(async {
            store.upsert("c", record("far", vec![0.0, 1.0])).await.unwrap();
            store.upsert("c", record("near", vec![1.0, 0.1])).await.unwrap();
            store.upsert("c", record("exact", vec![1.0, 0.0])).await.unwrap();

            let matches = store
                .get_nearest_matches("c", &[1.0, 0.0], 2, 0.0)
                .await
                .unwrap();
            let ids: Vec<&str> = matches.iter().map(|(r, _)| r.id.as_str()).collect();
            assert_eq!(ids, vec!["exact", "near"]);
        });
    }

    #[test]
    fn unknown_collection_is_empty() {
        let store = VolatileMemoryStore::new();
        let matches =
            tokio_test::block_on(store.get_nearest_matches("missing", &[1.0], 5, 0.0)).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn upsert_replaces_same_id() {
        let store = VolatileMemoryStore::new();
        tokio_test::block_on(async {
            store.upsert("c", record("a", vec![1.0])).await.unwrap();
            store.upsert("c", record("a", vec![0.5])).await.unwrap();
            assert_eq!(store.record_count("c").await, 1);
            assert_eq!(store.collections().await.unwrap(), vec!["c".to_string()]);
        });
    }

    #[test]
    fn min_relevance_filters() {
        let store = VolatileMemoryStore::new();
        tokio_test::block_on(async {
            store.upsert("c", record("orthogonal", vec![0.0, 1.0])).await.unwrap();
            let matches = store
                .get_nearest_matches("c", &[1.0, 0.0], 5, 0.5)
                .await
                .unwrap();
            assert!(matches.is_empty());
        });
    }
}

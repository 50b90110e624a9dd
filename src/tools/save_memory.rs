use super::{Capability, Tool};
use crate::{
    error::Result,
    memory::SemanticMemory,
    schemas::validator::{parameters_schema_for, parse_params},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::HashMap, pin::Pin, sync::Arc};

/// Parameters for saving research to memory
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SaveToMemoryParams {
    /// The content to save to memory
    pub content: String,
    /// The research topic for categorization
    pub topic: String,
}

/// Description stored alongside research saved for `topic`
pub fn research_description(topic: &str) -> String {
    format!("Research on {}", topic)
}

/// Stores research snippets in the kernel's semantic memory
#[derive(Debug, Clone)]
pub struct SaveToMemoryTool {
    memory: Arc<dyn SemanticMemory>,
    collection: String,
}

impl SaveToMemoryTool {
    pub fn new(memory: Arc<dyn SemanticMemory>, collection: impl Into<String>) -> Self {
        Self {
            memory,
            collection: collection.into(),
        }
    }
}

impl Tool for SaveToMemoryTool {
    fn capability(&self) -> Capability {
        Capability::SaveToMemory
    }

    fn parameters_schema(&self) -> Value {
        parameters_schema_for::<SaveToMemoryParams>()
    }

    fn execute(
        &self,
        parameters: Value,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Value>> + Send + '_>> {
        Box::pin(async move {
            let params: SaveToMemoryParams = parse_params(self.capability(), parameters)?;

            let mut metadata = HashMap::new();
            metadata.insert("topic".to_string(), params.topic.clone());

            let id = self
                .memory
                .save_information(
                    &self.collection,
                    &params.content,
                    &research_description(&params.topic),
                    metadata,
                )
                .await?;

            Ok(serde_json::json!({
                "status": "Content saved to memory successfully",
                "collection": self.collection,
                "id": id
            }))
        })
    }
}

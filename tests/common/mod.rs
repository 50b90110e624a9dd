#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};
use web_research::{
    error::{ResearchError, Result},
    ChatCompletionService, ContentExtractor, EmbeddingGenerator, Kernel, KernelSettings,
    SearchBackend, SemanticTextMemory, VolatileMemoryStore, WebSearchClient,
};

/// Chat service that replays canned responses and records every request
#[derive(Debug, Default)]
pub struct ScriptedChat {
    responses: Mutex<VecDeque<Value>>,
    requests: Mutex<Vec<Value>>,
}

impl ScriptedChat {
    pub fn new(responses: Vec<Value>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatCompletionService for ScriptedChat {
    async fn complete(&self, request: &Value) -> Result<Value> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ResearchError::Unknown("script exhausted".to_string()))
    }
}

/// Every text embeds to the same vector, so every record is recalled
#[derive(Debug)]
pub struct ConstantEmbeddings;

#[async_trait]
impl EmbeddingGenerator for ConstantEmbeddings {
    async fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.5]).collect())
    }
}

pub fn text_reply(content: &str, completion_tokens: u32) -> Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {
            "prompt_tokens": 10,
            "completion_tokens": completion_tokens,
            "total_tokens": 10 + completion_tokens
        }
    })
}

pub fn tool_reply(id: &str, name: &str, arguments: Value, completion_tokens: u32) -> Value {
    json!({
        "choices": [{"message": {
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": id,
                "type": "function",
                "function": {"name": name, "arguments": arguments.to_string()}
            }]
        }}],
        "usage": {
            "prompt_tokens": 10,
            "completion_tokens": completion_tokens,
            "total_tokens": 10 + completion_tokens
        }
    })
}

/// Kernel wired to the scripted chat, in-memory storage and `search_endpoint`
pub fn test_kernel(chat: Arc<ScriptedChat>, search_endpoint: &str) -> Kernel {
    let memory = SemanticTextMemory::new(
        Arc::new(VolatileMemoryStore::new()),
        Arc::new(ConstantEmbeddings),
    );
    Kernel::new(
        KernelSettings::default().with_model("test-model"),
        chat,
        Arc::new(memory),
        WebSearchClient::new(SearchBackend::DuckDuckGo).with_endpoint(search_endpoint),
        ContentExtractor::new(),
    )
    .unwrap()
}

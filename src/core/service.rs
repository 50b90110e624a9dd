use crate::{error::Result, services::completion::token_usage};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// A chat-completion backend the kernel talks to.
///
/// `request` is an OpenAI-style `chat/completions` body and the returned
/// value is the raw completion response.
#[async_trait]
pub trait ChatCompletionService: Send + Sync + std::fmt::Debug {
    async fn complete(&self, request: &Value) -> Result<Value>;
}

/// Chat service that keeps a running total of the completion tokens its
/// responses report
#[derive(Debug)]
pub struct MeteredChat {
    inner: Arc<dyn ChatCompletionService>,
    completion_tokens: AtomicU64,
}

impl MeteredChat {
    pub fn new(inner: Arc<dyn ChatCompletionService>) -> Self {
        Self {
            inner,
            completion_tokens: AtomicU64::new(0),
        }
    }

    pub fn completion_tokens(&self) -> u64 {
        self.completion_tokens.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ChatCompletionService for MeteredChat {
    async fn complete(&self, request: &Value) -> Result<Value> {
        let response = self.inner.complete(request).await?;
        if let Some(usage) = token_usage(&response) {
            self.completion_tokens
                .fetch_add(u64::from(usage.completion_tokens), Ordering::Relaxed);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct FixedReply;

    #[async_trait]
    impl ChatCompletionService for FixedReply {
        async fn complete(&self, _request: &Value) -> Result<Value> {
            Ok(json!({
                "choices": [{"message": {"role": "assistant", "content": "ok"}}],
                "usage": {"prompt_tokens": 3, "completion_tokens": 7, "total_tokens": 10}
            }))
        }
    }

    #[test]
    fn totals_completion_tokens_across_calls() {
        let metered = MeteredChat::new(Arc::new(FixedReply));
        tokio_test::block_on(async {
            metered.complete(&json!({})).await.unwrap();
            metered.complete(&json!({})).await.unwrap();
        });
        assert_eq!(metered.completion_tokens(), 14);
    }
}

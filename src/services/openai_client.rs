use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::{
    config::DEFAULT_BASE_URL,
    core::service::ChatCompletionService,
    error::{ResearchError, Result},
    memory::embeddings::EmbeddingGenerator,
};

const MAX_RETRIES: usize = 3;

/// Minimal client for OpenAI-compatible chat and embedding endpoints
#[derive(Clone, Debug)]
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn chat_completion(&self, body: &Value) -> Result<Value> {
        self.post_json(&build_url(&self.base_url, "chat/completions"), body)
            .await
    }

    /// Embed every input with `model`, preserving input order.
    pub async fn embeddings(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = json!({
            "model": model,
            "input": inputs,
        });
        let response = self
            .post_json(&build_url(&self.base_url, "embeddings"), &body)
            .await?;
        parse_embeddings(&response, inputs.len())
    }

    async fn post_json(&self, request_url: &str, body: &Value) -> Result<Value> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| ResearchError::Unknown(format!("Failed to build HTTP client: {err}")))?;

        let mut attempt = 0;
        let mut backoff = Duration::from_millis(250);

        loop {
            debug!(url = request_url, attempt, "posting to model endpoint");

            let response = client
                .post(request_url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .header("X-Title", "web-research")
                .json(body)
                .send()
                .await
                .map_err(|err| {
                    if err.is_timeout() {
                        ResearchError::Timeout(format!("Request to {request_url} timed out"))
                    } else {
                        ResearchError::Unknown(format!("HTTP request failed: {err}"))
                    }
                })?;

            let status = response.status();
            let headers = response.headers().clone();
            let response_text = response
                .text()
                .await
                .map_err(|err| ResearchError::Unknown(format!("Failed to read response: {err}")))?;

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after_duration = headers
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(backoff);

                if attempt < MAX_RETRIES {
                    warn!(?retry_after_duration, "rate limited, retrying");
                    tokio::time::sleep(retry_after_duration).await;
                    attempt += 1;
                    backoff *= 2;
                    continue;
                }

                return Err(ResearchError::RateLimit {
                    retry_after: retry_after_duration.as_secs().max(1),
                });
            }

            if status.is_server_error() && attempt < MAX_RETRIES {
                warn!(%status, "server error, retrying");
                tokio::time::sleep(backoff).await;
                attempt += 1;
                backoff *= 2;
                continue;
            }

            let response_json: Value = serde_json::from_str(&response_text)
                .map_err(|err| ResearchError::Unknown(format!("Failed to parse JSON: {err}")))?;

            if !status.is_success() {
                let api_message = response_json
                    .get("error")
                    .and_then(|error| error.get("message"))
                    .and_then(|value| value.as_str())
                    .map(|s| s.to_string())
                    .unwrap_or(response_text.clone());

                return Err(ResearchError::Unknown(format!(
                    "HTTP {} error: {}",
                    status, api_message
                )));
            }

            if let Some(error) = response_json.get("error") {
                let error_message = error
                    .get("message")
                    .and_then(|value| value.as_str())
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| error.to_string());
                return Err(ResearchError::Unknown(format!("API error: {}", error_message)));
            }

            return Ok(response_json);
        }
    }
}

#[async_trait]
impl ChatCompletionService for OpenAIClient {
    async fn complete(&self, request: &Value) -> Result<Value> {
        self.chat_completion(request).await
    }
}

/// Embedding generator backed by an OpenAI-compatible `/embeddings` endpoint
#[derive(Clone, Debug)]
pub struct OpenAIEmbeddings {
    client: OpenAIClient,
    model: String,
}

impl OpenAIEmbeddings {
    pub fn new(client: OpenAIClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl EmbeddingGenerator for OpenAIEmbeddings {
    async fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.client.embeddings(&self.model, texts).await
    }
}

fn build_url(base_url: &str, endpoint: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with(endpoint) {
        trimmed.to_string()
    } else {
        format!("{}/{}", trimmed, endpoint)
    }
}

fn parse_embeddings(response: &Value, expected: usize) -> Result<Vec<Vec<f32>>> {
    let data = response
        .get("data")
        .and_then(|value| value.as_array())
        .ok_or_else(|| {
            ResearchError::Memory("Missing 'data' array in embeddings response".to_string())
        })?;

    let mut indexed = Vec::with_capacity(data.len());
    for (position, item) in data.iter().enumerate() {
        let index = item
            .get("index")
            .and_then(|value| value.as_u64())
            .map(|value| value as usize)
            .unwrap_or(position);
        let vector = item
            .get("embedding")
            .and_then(|value| value.as_array())
            .ok_or_else(|| {
                ResearchError::Memory("Embedding entry is missing its vector".to_string())
            })?
            .iter()
            .map(|component| component.as_f64().map(|v| v as f32))
            .collect::<Option<Vec<f32>>>()
            .ok_or_else(|| {
                ResearchError::Memory("Embedding vector contains non-numeric values".to_string())
            })?;
        indexed.push((index, vector));
    }

    if indexed.len() != expected {
        return Err(ResearchError::Memory(format!(
            "Expected {} embeddings, received {}",
            expected,
            indexed.len()
        )));
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}

#[derive(Clone, Debug)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Value>,
    tools: Vec<Value>,
    tool_choice: Option<Value>,
    max_tokens: Option<u32>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            tool_choice: None,
            max_tokens: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: Value) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn into_value(self) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.messages,
        });

        if !self.tools.is_empty() {
            body["tools"] = Value::Array(self.tools);
        }

        if let Some(tool_choice) = self.tool_choice {
            body["tool_choice"] = tool_choice;
        }

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_appends_endpoint_once() {
        assert_eq!(
            build_url("https://api.example.com/v1/", "chat/completions"),
            "https://api.example.com/v1/chat/completions"
        );
        assert_eq!(
            build_url("https://api.example.com/v1/embeddings", "embeddings"),
            "https://api.example.com/v1/embeddings"
        );
    }

    #[test]
    fn parse_embeddings_orders_by_index() {
        let response = json!({
            "data": [
                {"index": 1, "embedding": [0.0, 1.0]},
                {"index": 0, "embedding": [1.0, 0.0]}
            ]
        });
        let vectors = parse_embeddings(&response, 2).unwrap();
        assert_eq!(vectors[0], vec![1.0, 0.0]);
        assert_eq!(vectors[1], vec![0.0, 1.0]);
    }

    #[test]
    fn parse_embeddings_rejects_count_mismatch() {
        let response = json!({"data": [{"embedding": [0.5]}]});
        assert!(matches!(
            parse_embeddings(&response, 2),
            Err(ResearchError::Memory(_))
        ));
    }

    #[test]
    fn request_omits_empty_tools() {
        let body = ChatCompletionRequest::new("m", vec![json!({"role": "user", "content": "hi"})])
            .with_max_tokens(Some(10))
            .into_value();
        assert!(body.get("tools").is_none());
        assert_eq!(body["max_tokens"], 10);
        assert_eq!(body["model"], "m");
    }
}

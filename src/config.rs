//! Runtime configuration for the research kernel, planner and tools.

use crate::{
    error::{ResearchError, Result},
    tools::web_search::SearchBackend,
};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-4.1-mini";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_COLLECTION: &str = "research_data";
pub const DEFAULT_PAPER_COLLECTION: &str = "papers";
pub const DEFAULT_MAX_PAPERS: usize = 5;
pub const DEFAULT_MAX_SEARCH_RESULTS: usize = 3;
pub const DEFAULT_EXTRACT_MAX_CHARS: usize = 2000;
pub const DEFAULT_RECALL_LIMIT: usize = 5;
pub const DEFAULT_MAX_ITERATIONS: usize = 15;
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Everything needed to assemble a [`crate::Kernel`] and a [`crate::Planner`].
#[derive(Debug, Clone)]
pub struct ResearchConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Falls back to `base_url` when unset
    pub embedding_base_url: Option<String>,
    pub embedding_model: String,
    pub search_backend: SearchBackend,
    /// Overrides the backend's public endpoint
    pub search_endpoint: Option<String>,
    pub max_search_results: usize,
    pub extract_max_chars: usize,
    pub collection: String,
    /// Collection the arXiv pipeline stores abstracts in
    pub paper_collection: String,
    pub max_papers: usize,
    pub recall_limit: usize,
    pub max_iterations: usize,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl ResearchConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            embedding_base_url: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            search_backend: SearchBackend::DuckDuckGo,
            search_endpoint: None,
            max_search_results: DEFAULT_MAX_SEARCH_RESULTS,
            extract_max_chars: DEFAULT_EXTRACT_MAX_CHARS,
            collection: DEFAULT_COLLECTION.to_string(),
            paper_collection: DEFAULT_PAPER_COLLECTION.to_string(),
            max_papers: DEFAULT_MAX_PAPERS,
            recall_limit: DEFAULT_RECALL_LIMIT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(120),
        }
    }

    /// Build a config from the process environment.
    ///
    /// `OPENAI_API_KEY` is required; everything else goes through
    /// [`ResearchConfig::apply_env`].
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ResearchError::Config(
                "OPENAI_API_KEY environment variable must be set before creating a kernel"
                    .to_string(),
            )
        })?;

        Self::new(api_key).apply_env()
    }

    /// Apply the environment overrides that do not involve the API key:
    /// `OPENAI_BASE_URL` (or `OPENROUTER_BASE_URL`), `RESEARCH_MODEL`,
    /// `EMBEDDING_BASE_URL`, `EMBEDDING_MODEL` and `SEARCH_BACKEND`.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(base_url) = lookup("OPENAI_BASE_URL").or_else(|| lookup("OPENROUTER_BASE_URL"))
        {
            self.base_url = base_url;
        }
        if let Some(model) = lookup("RESEARCH_MODEL") {
            self.model = model;
        }
        if let Some(url) = lookup("EMBEDDING_BASE_URL") {
            self.embedding_base_url = Some(url);
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            self.embedding_model = model;
        }
        if let Some(backend) = lookup("SEARCH_BACKEND") {
            self.search_backend = backend.parse()?;
        }
        Ok(self)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_search_backend(mut self, backend: SearchBackend) -> Self {
        self.search_backend = backend;
        self
    }

    pub fn with_search_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.search_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn embedding_base_url(&self) -> &str {
        self.embedding_base_url.as_deref().unwrap_or(&self.base_url)
    }

    /// Reject values that would make the pipeline meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(ResearchError::Config("API key must not be empty".to_string()));
        }
        if self.max_iterations == 0 {
            return Err(ResearchError::Config(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(ResearchError::Config(
                "max_tokens must be at least 1".to_string(),
            ));
        }
        if self.max_search_results == 0 || self.extract_max_chars == 0 || self.max_papers == 0 {
            return Err(ResearchError::Config(
                "search result and extraction limits must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_research_settings() {
        let config = ResearchConfig::new("key");
        assert_eq!(config.max_iterations, 15);
        assert_eq!(config.max_tokens, 4000);
        assert_eq!(config.max_search_results, 3);
        assert_eq!(config.extract_max_chars, 2000);
        assert_eq!(config.collection, "research_data");
        assert_eq!(config.paper_collection, "papers");
        assert_eq!(config.max_papers, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn embedding_url_falls_back_to_chat_url() {
        let config = ResearchConfig::new("key").with_base_url("http://localhost:1234/v1");
        assert_eq!(config.embedding_base_url(), "http://localhost:1234/v1");
    }

    fn lookup_from<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name: &str| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn environment_overrides_apply_to_an_explicit_key() {
        let vars = [
            ("OPENROUTER_BASE_URL", "http://local/v1"),
            ("RESEARCH_MODEL", "local-model"),
            ("EMBEDDING_MODEL", "local-embed"),
            ("SEARCH_BACKEND", "stract"),
        ];
        let config = ResearchConfig::new("cli-key")
            .apply_overrides(lookup_from(&vars))
            .unwrap();

        assert_eq!(config.api_key, "cli-key");
        assert_eq!(config.base_url, "http://local/v1");
        assert_eq!(config.model, "local-model");
        assert_eq!(config.embedding_model, "local-embed");
        assert_eq!(config.search_backend, SearchBackend::Stract);
    }

    #[test]
    fn openai_base_url_wins_over_openrouter() {
        let vars = [
            ("OPENAI_BASE_URL", "http://openai/v1"),
            ("OPENROUTER_BASE_URL", "http://router/v1"),
        ];
        let config = ResearchConfig::new("key")
            .apply_overrides(lookup_from(&vars))
            .unwrap();
        assert_eq!(config.base_url, "http://openai/v1");
    }

    #[test]
    fn invalid_search_backend_is_rejected() {
        let vars = [("SEARCH_BACKEND", "altavista")];
        let result = ResearchConfig::new("key").apply_overrides(lookup_from(&vars));
        assert!(matches!(result, Err(ResearchError::Config(_))));
    }

    #[test]
    fn validate_rejects_zero_budget() {
        let config = ResearchConfig::new("key").with_max_tokens(0);
        assert!(matches!(config.validate(), Err(ResearchError::Config(_))));

        let config = ResearchConfig::new("  ");
        assert!(config.validate().is_err());
    }
}

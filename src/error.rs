use thiserror::Error;

/// Main error type for the research system
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid function call: {0}")]
    InvalidFunctionCall(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Memory error: {0}")]
    Memory(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Maximum iterations exceeded: {0}")]
    MaxIterations(usize),

    #[error("Token budget of {0} tokens exhausted")]
    TokenBudget(u32),

    #[error("Rate limit exceeded: retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Why a page could not be turned into text.
///
/// Every variant renders with the `Error extracting content:` prefix so that
/// a failed extraction is recognisable wherever it ends up being shown.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Error extracting content: invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Error extracting content: request to {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Error extracting content: {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Error extracting content: could not read body of {url}: {reason}")]
    Body { url: String, reason: String },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ResearchError>;

impl ResearchError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ResearchError::Validation(_)
                | ResearchError::RateLimit { .. }
                | ResearchError::Timeout(_)
                | ResearchError::Search(_)
                | ResearchError::Extraction(ExtractionError::Fetch { .. })
        )
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ResearchError::Config(_) => "CONFIG_ERROR",
            ResearchError::Serialization(_) => "SERIALIZATION_ERROR",
            ResearchError::Validation(_) => "VALIDATION_ERROR",
            ResearchError::ToolExecution(_) => "TOOL_EXECUTION_ERROR",
            ResearchError::ToolNotFound(_) => "TOOL_NOT_FOUND",
            ResearchError::InvalidFunctionCall(_) => "INVALID_FUNCTION_CALL",
            ResearchError::Search(_) => "SEARCH_ERROR",
            ResearchError::Extraction(_) => "EXTRACTION_ERROR",
            ResearchError::Memory(_) => "MEMORY_ERROR",
            ResearchError::Template(_) => "TEMPLATE_ERROR",
            ResearchError::Timeout(_) => "TIMEOUT_ERROR",
            ResearchError::MaxIterations(_) => "MAX_ITERATIONS_EXCEEDED",
            ResearchError::TokenBudget(_) => "TOKEN_BUDGET_EXHAUSTED",
            ResearchError::RateLimit { .. } => "RATE_LIMIT_ERROR",
            ResearchError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// Convert to a structured error payload
    pub fn to_error_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "retryable": self.is_retryable()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_errors_share_prefix() {
        let errors = [
            ExtractionError::InvalidUrl {
                url: "nope".to_string(),
                reason: "relative URL without a base".to_string(),
            },
            ExtractionError::Fetch {
                url: "http://unreachable.invalid".to_string(),
                reason: "dns error".to_string(),
            },
            ExtractionError::Status {
                url: "http://example.com".to_string(),
                status: 404,
            },
        ];

        for error in errors {
            assert!(error.to_string().starts_with("Error extracting content:"));
            let wrapped = ResearchError::from(error);
            assert!(wrapped.to_string().starts_with("Error extracting content:"));
            assert_eq!(wrapped.error_code(), "EXTRACTION_ERROR");
        }
    }

    #[test]
    fn payload_carries_code_and_retryable() {
        let payload = ResearchError::TokenBudget(4000).to_error_payload();
        assert_eq!(payload["error"]["code"], "TOKEN_BUDGET_EXHAUSTED");
        assert_eq!(payload["error"]["retryable"], false);
        assert!(payload["error"]["message"]
            .as_str()
            .unwrap()
            .contains("4000"));
    }
}

use super::{Capability, Tool};
use crate::{
    error::{ExtractionError, ResearchError, Result},
    schemas::validator::{parameters_schema_for, parse_params},
};
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Node};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{pin::Pin, sync::Arc, time::Duration};
use tracing::{debug, info};

/// Subtrees whose text never reaches the extracted content
pub const STRIPPED_TAGS: [&str; 5] = ["script", "style", "nav", "header", "footer"];

const TRUNCATION_MARKER: &str = "...";

/// Visible text of one page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub url: String,
    pub text: String,
    pub truncated: bool,
}

/// Fetches pages and reduces them to plain text
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    client: Client,
    max_chars: usize,
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            max_chars: crate::config::DEFAULT_EXTRACT_MAX_CHARS,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder().timeout(timeout).build().map_err(|err| {
            ResearchError::Config(format!("Failed to build extractor HTTP client: {err}"))
        })?;
        Ok(self)
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Fetch `url` and return its visible text.
    pub async fn extract(&self, url: &str) -> std::result::Result<ExtractedDocument, ExtractionError> {
        let parsed = Url::parse(url.trim()).map_err(|err| ExtractionError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ExtractionError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        info!("Extracting content from {}", parsed);

        let response = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|err| ExtractionError::Fetch {
                url: url.to_string(),
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await.map_err(|err| ExtractionError::Body {
            url: url.to_string(),
            reason: err.to_string(),
        })?;

        let (text, truncated) = extract_text_with_flag(&html, self.max_chars);
        debug!(chars = text.chars().count(), truncated, "extracted page text");

        Ok(ExtractedDocument {
            url: parsed.to_string(),
            text,
            truncated,
        })
    }
}

/// Strip non-content elements from `html` and return at most `max_chars`
/// characters of its text, followed by `...` when cut short.
pub fn extract_text(html: &str, max_chars: usize) -> String {
    extract_text_with_flag(html, max_chars).0
}

fn extract_text_with_flag(html: &str, max_chars: usize) -> (String, bool) {
    let document = Html::parse_document(html);
    let mut fragments = Vec::new();
    collect_text(&document.root_element(), &mut fragments);
    truncate_chars(fragments.join(" "), max_chars)
}

fn collect_text<'a>(element: &ElementRef<'a>, fragments: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    fragments.push(trimmed);
                }
            }
            Node::Element(el) => {
                if STRIPPED_TAGS.contains(&el.name()) {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(&child_ref, fragments);
                }
            }
            _ => {}
        }
    }
}

/// Cut `text` to `max_chars` characters, counting chars rather than bytes
fn truncate_chars(text: String, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (format!("{}{}", &text[..byte_idx], TRUNCATION_MARKER), true),
        None => (text, false),
    }
}

/// Parameters accepted by the extraction tool
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ExtractContentParams {
    /// The webpage URL to extract content from
    pub url: String,
}

/// Tool exposing [`ContentExtractor`] to the planner.
///
/// Failures come back as `ResearchError::Extraction`, so the planner sees an
/// error observation rather than an error message posing as page text.
#[derive(Debug, Clone)]
pub struct ExtractContentTool {
    extractor: Arc<ContentExtractor>,
}

impl ExtractContentTool {
    pub fn new(extractor: Arc<ContentExtractor>) -> Self {
        Self { extractor }
    }
}

impl Tool for ExtractContentTool {
    fn capability(&self) -> Capability {
        Capability::ExtractContent
    }

    fn parameters_schema(&self) -> Value {
        parameters_schema_for::<ExtractContentParams>()
    }

    fn execute(
        &self,
        parameters: Value,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Value>> + Send + '_>> {
        Box::pin(async move {
            let params: ExtractContentParams = parse_params(self.capability(), parameters)?;
            let document = self.extractor.extract(&params.url).await?;
            Ok(serde_json::json!({
                "url": document.url,
                "content": document.text,
                "truncated": document.truncated
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_non_content_tags() {
        let html = r#"<html><head><title>Title</title><style>.x{color:red}</style>
            <script>var HIDDEN_SCRIPT = 1;</script></head>
            <body><header>HIDDEN header</header><nav><a>HIDDEN</a></nav>
            <p>Visible   paragraph</p><footer>HIDDEN footer</footer></body></html>"#;
        let text = extract_text(html, 2000);
        assert!(!text.contains("HIDDEN"));
        assert!(!text.contains("color:red"));
        assert!(text.contains("Title"));
        assert!(text.contains("Visible   paragraph"));
    }

    #[test]
    fn joins_text_nodes_with_single_space() {
        let html = "<body><p>  one </p>\n\n<div>two<span>three</span></div></body>";
        assert_eq!(extract_text(html, 2000), "one two three");
    }

    #[test]
    fn short_text_is_returned_unchanged() {
        let html = "<p>short text</p>";
        let (text, truncated) = extract_text_with_flag(html, 2000);
        assert_eq!(text, "short text");
        assert!(!truncated);
    }

    #[test]
    fn long_text_is_truncated_with_marker() {
        let body = "a".repeat(5000);
        let html = format!("<p>{}</p>", body);
        let text = extract_text(&html, 2000);
        assert_eq!(text.chars().count(), 2003);
        assert!(text.ends_with("..."));
    }

    #[test]
    fn exact_limit_is_not_truncated() {
        let html = format!("<p>{}</p>", "b".repeat(2000));
        let (text, truncated) = extract_text_with_flag(&html, 2000);
        assert_eq!(text.chars().count(), 2000);
        assert!(!truncated);
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let html = format!("<p>{}</p>", "é".repeat(30));
        let text = extract_text(&html, 10);
        assert_eq!(text, format!("{}...", "é".repeat(10)));
    }

    #[tokio::test]
    async fn malformed_url_is_an_extraction_error() {
        let extractor = ContentExtractor::new();
        let err = extractor.extract("not a url").await.unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidUrl { .. }));
        assert!(err.to_string().starts_with("Error extracting content:"));

        let err = extractor.extract("ftp://example.com/file").await.unwrap_err();
        assert!(err.to_string().starts_with("Error extracting content:"));
    }
}

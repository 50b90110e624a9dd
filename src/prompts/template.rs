//! A small prompt template language.
//!
//! Supported blocks:
//! - `{{$name}}` inserts the argument `name`
//! - `{{recall 'collection' $name}}` searches memory for the value of
//!   `name` and inserts the recalled texts, one per line

use crate::{
    error::{ResearchError, Result},
    memory::SemanticMemory,
};
use std::collections::HashMap;

pub type TemplateArguments = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Variable(String),
    Recall { collection: String, variable: String },
}

/// Parsed prompt template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }
            let after_open = &rest[start + 2..];
            let end = after_open.find("}}").ok_or_else(|| {
                ResearchError::Template("Unclosed '{{' block in prompt template".to_string())
            })?;
            segments.push(parse_block(after_open[..end].trim())?);
            rest = &after_open[end + 2..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names of every argument the template reads
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for segment in &self.segments {
            let name = match segment {
                Segment::Variable(name) => name.as_str(),
                Segment::Recall { variable, .. } => variable.as_str(),
                Segment::Text(_) => continue,
            };
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    pub fn uses_recall(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Recall { .. }))
    }

    /// Render with `arguments`, resolving recall blocks against `memory`
    pub async fn render(
        &self,
        arguments: &TemplateArguments,
        memory: Option<&dyn SemanticMemory>,
        recall_limit: usize,
    ) -> Result<String> {
        let mut output = String::with_capacity(self.source.len());

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => output.push_str(text),
                Segment::Variable(name) => output.push_str(lookup(arguments, name)?),
                Segment::Recall {
                    collection,
                    variable,
                } => {
                    let memory = memory.ok_or_else(|| {
                        ResearchError::Template(
                            "Template uses recall but no memory is available".to_string(),
                        )
                    })?;
                    let query = lookup(arguments, variable)?;
                    let recalled = memory.search(collection, query, recall_limit).await?;
                    let lines: Vec<String> = recalled
                        .iter()
                        .map(|item| format!("- {}", item.text))
                        .collect();
                    output.push_str(&lines.join("\n"));
                }
            }
        }

        Ok(output)
    }
}

fn lookup<'a>(arguments: &'a TemplateArguments, name: &str) -> Result<&'a str> {
    arguments
        .get(name)
        .map(|value| value.as_str())
        .ok_or_else(|| ResearchError::Template(format!("Missing template argument '{}'", name)))
}

fn parse_block(body: &str) -> Result<Segment> {
    if let Some(name) = body.strip_prefix('$') {
        return Ok(Segment::Variable(parse_identifier(name)?));
    }

    if let Some(args) = body.strip_prefix("recall") {
        let args = args.trim_start();
        let quote = args.chars().next().filter(|c| *c == '\'' || *c == '"').ok_or_else(|| {
            ResearchError::Template(format!(
                "recall expects a quoted collection name: '{{{{{}}}}}'",
                body
            ))
        })?;
        let after_quote = &args[1..];
        let close = after_quote.find(quote).ok_or_else(|| {
            ResearchError::Template(format!("Unterminated collection name in '{}'", body))
        })?;
        let collection = after_quote[..close].to_string();
        let variable = after_quote[close + 1..].trim();
        let variable = variable.strip_prefix('$').unwrap_or(variable);

        return Ok(Segment::Recall {
            collection,
            variable: parse_identifier(variable)?,
        });
    }

    Err(ResearchError::Template(format!(
        "Unsupported template block '{{{{{}}}}}'",
        body
    )))
}

fn parse_identifier(name: &str) -> Result<String> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(name.to_string())
    } else {
        Err(ResearchError::Template(format!(
            "Invalid template variable name '{}'",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryQueryResult;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct FixedMemory;

    #[async_trait]
    impl SemanticMemory for FixedMemory {
        async fn save_information(
            &self,
            _collection: &str,
            _text: &str,
            _description: &str,
            _metadata: HashMap<String, String>,
        ) -> Result<String> {
            Ok("id".to_string())
        }

        async fn search(
            &self,
            collection: &str,
            query: &str,
            limit: usize,
        ) -> Result<Vec<MemoryQueryResult>> {
            Ok((0..limit.min(2))
                .map(|i| MemoryQueryResult {
                    id: i.to_string(),
                    text: format!("{collection}:{query}:{i}"),
                    description: String::new(),
                    additional_metadata: HashMap::new(),
                    relevance: 1.0,
                })
                .collect())
        }
    }

    fn args(pairs: &[(&str, &str)]) -> TemplateArguments {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn substitutes_variables() {
        let template = PromptTemplate::parse("Content: {{$input}}\nTopic: {{ $topic }}").unwrap();
        assert_eq!(template.variables(), vec!["input", "topic"]);
        let rendered = template
            .render(&args(&[("input", "abc"), ("topic", "t")]), None, 5)
            .await
            .unwrap();
        assert_eq!(rendered, "Content: abc\nTopic: t");
    }

    #[tokio::test]
    async fn recall_inlines_memory_results() {
        let template =
            PromptTemplate::parse("Collected: {{recall 'research_data' topic}} end").unwrap();
        assert!(template.uses_recall());
        let rendered = template
            .render(&args(&[("topic", "q")]), Some(&FixedMemory), 5)
            .await
            .unwrap();
        assert_eq!(
            rendered,
            "Collected: - research_data:q:0\n- research_data:q:1 end"
        );
    }

    #[tokio::test]
    async fn missing_argument_is_an_error() {
        let template = PromptTemplate::parse("{{$input}}").unwrap();
        let err = template.render(&args(&[]), None, 5).await.unwrap_err();
        assert_eq!(err.error_code(), "TEMPLATE_ERROR");
    }

    #[tokio::test]
    async fn recall_without_memory_is_an_error() {
        let template = PromptTemplate::parse("{{recall 'c' $topic}}").unwrap();
        assert!(template
            .render(&args(&[("topic", "x")]), None, 5)
            .await
            .is_err());
    }

    #[test]
    fn rejects_malformed_blocks() {
        assert!(PromptTemplate::parse("{{$input").is_err());
        assert!(PromptTemplate::parse("{{$research_data $topic}}").is_err());
        assert!(PromptTemplate::parse("{{unknown thing}}").is_err());
        assert!(PromptTemplate::parse("{{recall research_data topic}}").is_err());
    }

    #[test]
    fn plain_text_round_trips() {
        let template = PromptTemplate::parse("no blocks here").unwrap();
        assert!(template.variables().is_empty());
        assert_eq!(template.source(), "no blocks here");
    }
}

use super::template::{PromptTemplate, TemplateArguments};
use crate::{
    core::service::ChatCompletionService,
    error::{ResearchError, Result},
    memory::SemanticMemory,
    services::{
        completion::{first_message, message_content},
        openai_client::ChatCompletionRequest,
    },
    tools::Capability,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub const ANALYZE_CONTENT_TEMPLATE: &str = "Content: {{$input}}

Analyze this content and extract key points. Focus on:
1. Main concepts and ideas
2. Key findings or statements
3. Important relationships
4. Credibility of information

Format your response as bullet points.";

pub const CREATE_SUMMARY_TEMPLATE: &str = "Research Topic: {{$topic}}
Collected Information:
{{recall 'research_data' $topic}}

Create a comprehensive summary that:
1. Synthesizes the main findings
2. Highlights key agreements and contradictions
3. Identifies gaps in the information
4. Suggests areas for further research

Keep the summary clear and well-structured.";

pub const SUMMARIZE_RESEARCH_TEMPLATE: &str = "Research Topic: {{$topic}}
Papers to analyze:
{{$papers}}

Create a comprehensive research summary that:
1. Identifies the main themes and findings
2. Highlights significant breakthroughs
3. Notes areas of consensus and disagreement
4. Suggests future research directions

Format the summary in a clear, academic style.";

/// A prompt template bound to a chat model
#[derive(Debug, Clone)]
pub struct PromptFunction {
    capability: Capability,
    template: PromptTemplate,
    chat: Arc<dyn ChatCompletionService>,
    memory: Option<Arc<dyn SemanticMemory>>,
    model: String,
    max_tokens: Option<u32>,
    recall_limit: usize,
}

impl PromptFunction {
    pub fn new(
        capability: Capability,
        template: &str,
        chat: Arc<dyn ChatCompletionService>,
        model: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            capability,
            template: PromptTemplate::parse(template)?,
            chat,
            memory: None,
            model: model.into(),
            max_tokens: None,
            recall_limit: crate::config::DEFAULT_RECALL_LIMIT,
        })
    }

    /// `AnalyzeContent`: bullet-point key facts of `input`
    pub fn analyze_content(
        chat: Arc<dyn ChatCompletionService>,
        model: impl Into<String>,
    ) -> Result<Self> {
        Self::new(Capability::AnalyzeContent, ANALYZE_CONTENT_TEMPLATE, chat, model)
    }

    /// `CreateSummary`: summary of everything recalled for `topic` from `collection`
    pub fn create_summary(
        chat: Arc<dyn ChatCompletionService>,
        memory: Arc<dyn SemanticMemory>,
        model: impl Into<String>,
        collection: &str,
    ) -> Result<Self> {
        let template =
            CREATE_SUMMARY_TEMPLATE.replace("'research_data'", &format!("'{}'", collection));
        Ok(Self::new(Capability::CreateSummary, &template, chat, model)?.with_memory(memory))
    }

    /// `SummarizeResearch`: academic summary of the given paper titles and abstracts
    pub fn summarize_research(
        chat: Arc<dyn ChatCompletionService>,
        model: impl Into<String>,
    ) -> Result<Self> {
        Self::new(
            Capability::SummarizeResearch,
            SUMMARIZE_RESEARCH_TEMPLATE,
            chat,
            model,
        )
    }

    pub fn with_memory(mut self, memory: Arc<dyn SemanticMemory>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_recall_limit(mut self, recall_limit: usize) -> Self {
        self.recall_limit = recall_limit;
        self
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    /// Render the template and return the model's reply verbatim
    pub async fn invoke(&self, arguments: &TemplateArguments) -> Result<String> {
        let prompt = self
            .template
            .render(arguments, self.memory.as_deref(), self.recall_limit)
            .await?;

        info!(function = %self.capability, "invoking prompt function");

        let request = ChatCompletionRequest::new(
            self.model.clone(),
            vec![json!({
                "role": "user",
                "content": prompt
            })],
        )
        .with_max_tokens(self.max_tokens)
        .into_value();

        let response = self.chat.complete(&request).await?;
        let content = message_content(&first_message(&response)?);
        if content.is_empty() {
            return Err(ResearchError::ToolExecution(format!(
                "{} returned an empty completion",
                self.capability
            )));
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_parse_and_declare_their_inputs() {
        let analyze = PromptTemplate::parse(ANALYZE_CONTENT_TEMPLATE).unwrap();
        assert_eq!(analyze.variables(), vec!["input"]);
        assert!(!analyze.uses_recall());

        let summary = PromptTemplate::parse(CREATE_SUMMARY_TEMPLATE).unwrap();
        assert_eq!(summary.variables(), vec!["topic"]);
        assert!(summary.uses_recall());

        let papers = PromptTemplate::parse(SUMMARIZE_RESEARCH_TEMPLATE).unwrap();
        assert_eq!(papers.variables(), vec!["topic", "papers"]);
        assert!(!papers.uses_recall());
    }
}

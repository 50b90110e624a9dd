use super::{Capability, Tool};
use crate::{
    error::Result,
    prompts::{PromptFunction, TemplateArguments},
    schemas::validator::{parameters_schema_for, parse_params},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::pin::Pin;

/// Parameters for `AnalyzeContent`
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AnalyzeContentParams {
    /// The content to analyze
    pub input: String,
}

/// Parameters for `CreateSummary`
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CreateSummaryParams {
    /// The research topic to summarize from memory
    pub topic: String,
}

/// Parameters for `SummarizeResearch`
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SummarizeResearchParams {
    /// The research topic the papers cover
    pub topic: String,
    /// Titles and abstracts of the papers to analyze
    pub papers: String,
}

/// Exposes a [`PromptFunction`] as a planner tool
#[derive(Debug, Clone)]
pub struct PromptFunctionTool {
    function: PromptFunction,
}

impl PromptFunctionTool {
    pub fn new(function: PromptFunction) -> Self {
        Self { function }
    }

    fn arguments(&self, parameters: Value) -> Result<TemplateArguments> {
        let mut arguments = TemplateArguments::new();
        match self.function.capability() {
            Capability::CreateSummary => {
                let params: CreateSummaryParams = parse_params(self.capability(), parameters)?;
                arguments.insert("topic".to_string(), params.topic);
            }
            Capability::SummarizeResearch => {
                let params: SummarizeResearchParams =
                    parse_params(self.capability(), parameters)?;
                arguments.insert("topic".to_string(), params.topic);
                arguments.insert("papers".to_string(), params.papers);
            }
            capability => {
                let params: AnalyzeContentParams = parse_params(capability, parameters)?;
                arguments.insert("input".to_string(), params.input);
            }
        }
        Ok(arguments)
    }
}

impl Tool for PromptFunctionTool {
    fn capability(&self) -> Capability {
        self.function.capability()
    }

    fn parameters_schema(&self) -> Value {
        match self.function.capability() {
            Capability::CreateSummary => parameters_schema_for::<CreateSummaryParams>(),
            Capability::SummarizeResearch => parameters_schema_for::<SummarizeResearchParams>(),
            _ => parameters_schema_for::<AnalyzeContentParams>(),
        }
    }

    fn execute(
        &self,
        parameters: Value,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Value>> + Send + '_>> {
        Box::pin(async move {
            let arguments = self.arguments(parameters)?;
            let output = self.function.invoke(&arguments).await?;
            Ok(Value::String(output))
        })
    }
}

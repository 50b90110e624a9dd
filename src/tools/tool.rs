use crate::{
    error::{ResearchError, Result},
    schemas::validator::SchemaValidator,
};
use serde_json::Value;
use std::{collections::BTreeMap, fmt};

/// Every tool function the kernel can expose to the planner.
///
/// The set is closed: tools are bound to a capability when the kernel is
/// composed, and the only string handling is translating the function name
/// the model sends back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    SearchWeb,
    ExtractContent,
    SaveToMemory,
    AnalyzeContent,
    CreateSummary,
    SummarizeResearch,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::SearchWeb,
        Capability::ExtractContent,
        Capability::SaveToMemory,
        Capability::AnalyzeContent,
        Capability::CreateSummary,
        Capability::SummarizeResearch,
    ];

    /// Plugin the function belongs to
    pub fn plugin(self) -> &'static str {
        match self {
            Capability::SearchWeb | Capability::ExtractContent => "web",
            Capability::SaveToMemory => "research",
            Capability::AnalyzeContent
            | Capability::CreateSummary
            | Capability::SummarizeResearch => "ResearchPlugin",
        }
    }

    pub fn function_name(self) -> &'static str {
        match self {
            Capability::SearchWeb => "SearchWeb",
            Capability::ExtractContent => "ExtractContent",
            Capability::SaveToMemory => "SaveToMemory",
            Capability::AnalyzeContent => "AnalyzeContent",
            Capability::CreateSummary => "CreateSummary",
            Capability::SummarizeResearch => "SummarizeResearch",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Capability::SearchWeb => "Searches the web and returns up to three relevant URLs",
            Capability::ExtractContent => "Extracts main content from a webpage",
            Capability::SaveToMemory => "Saves research information to semantic memory",
            Capability::AnalyzeContent => "Analyzes and extracts key points from content.",
            Capability::CreateSummary => "Creates a summary from collected research.",
            Capability::SummarizeResearch => "Summarizes research papers on a specific topic",
        }
    }

    /// Name sent to the model, `plugin-Function`
    pub fn qualified_name(self) -> String {
        format!("{}-{}", self.plugin(), self.function_name())
    }

    /// Resolve a function name returned by the model.
    ///
    /// Accepts the qualified form, the bare function name, and the
    /// `plugin.Function` spelling some models produce.
    pub fn from_function_name(name: &str) -> Option<Self> {
        let bare = name
            .rsplit(|c| c == '-' || c == '.')
            .next()
            .unwrap_or(name);
        Capability::ALL.into_iter().find(|capability| {
            let qualified_ok = name == bare
                || (name.starts_with(capability.plugin())
                    && name.len() == capability.plugin().len() + 1 + bare.len());
            capability.function_name() == bare && qualified_ok
        })
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.plugin(), self.function_name())
    }
}

/// A tool that can be executed by the planner
pub trait Tool: Send + Sync + std::fmt::Debug {
    /// Which capability this tool implements
    fn capability(&self) -> Capability;

    /// JSON Schema for the tool's parameters
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with given parameters
    fn execute(
        &self,
        parameters: Value,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Value>> + Send + '_>>;
}

/// Registry binding each capability to one implementation
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<Capability, Box<dyn Tool>>,
    validator: SchemaValidator,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any earlier tool bound to the same capability
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let capability = tool.capability();
        self.validator
            .register_schema(capability, tool.parameters_schema());
        self.tools.insert(capability, Box::new(tool));
    }

    pub fn get(&self, capability: Capability) -> Option<&dyn Tool> {
        self.tools.get(&capability).map(|tool| tool.as_ref())
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.tools.contains_key(&capability)
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        self.tools.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validate arguments against the tool's schema and run it
    pub async fn execute(&self, capability: Capability, parameters: Value) -> Result<Value> {
        let tool = self
            .get(capability)
            .ok_or_else(|| ResearchError::ToolNotFound(capability.qualified_name()))?;
        self.validator.check(capability, &parameters)?;
        tool.execute(parameters).await
    }

    /// Resolve a model-supplied function name and run the matching tool
    pub async fn execute_function(&self, function_name: &str, parameters: Value) -> Result<Value> {
        let capability = Capability::from_function_name(function_name)
            .ok_or_else(|| ResearchError::ToolNotFound(function_name.to_string()))?;
        self.execute(capability, parameters).await
    }

    /// Generate tool schemas for OpenAI function calling
    pub fn to_openai_tools(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|(capability, tool)| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": capability.qualified_name(),
                        "description": capability.description(),
                        "parameters": tool.parameters_schema()
                    }
                })
            })
            .collect()
    }
}

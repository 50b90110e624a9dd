use crate::{
    config::{ResearchConfig, DEFAULT_COLLECTION, DEFAULT_MODEL, DEFAULT_RECALL_LIMIT},
    core::service::{ChatCompletionService, MeteredChat},
    error::Result,
    memory::{SemanticMemory, SemanticTextMemory, VolatileMemoryStore},
    prompts::PromptFunction,
    services::openai_client::{OpenAIClient, OpenAIEmbeddings},
    tools::{
        Capability, ContentExtractor, ExtractContentTool, PromptFunctionTool, SaveToMemoryTool,
        SearchWebTool, ToolRegistry, WebSearchClient,
    },
};
use std::sync::Arc;
use tracing::info;

/// Settings shared by the kernel's prompt functions and memory tools
#[derive(Debug, Clone)]
pub struct KernelSettings {
    pub model: String,
    pub collection: String,
    pub recall_limit: usize,
    /// Completion cap for prompt functions
    pub prompt_max_tokens: Option<u32>,
}

impl Default for KernelSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            recall_limit: DEFAULT_RECALL_LIMIT,
            prompt_max_tokens: Some(1000),
        }
    }
}

impl KernelSettings {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }
}

/// Composition root: the chat service, memory, web clients and the tools
/// built from them.
///
/// Every capability is bound when the kernel is constructed; nothing is
/// registered later by name.
#[derive(Debug)]
pub struct Kernel {
    settings: KernelSettings,
    chat: Arc<dyn ChatCompletionService>,
    /// Chat service used by prompt functions, metered so planner budgets
    /// can account for tool-side completions
    prompt_chat: Arc<MeteredChat>,
    memory: Arc<dyn SemanticMemory>,
    search: Arc<WebSearchClient>,
    extractor: Arc<ContentExtractor>,
    tools: ToolRegistry,
}

impl Kernel {
    pub fn new(
        settings: KernelSettings,
        chat: Arc<dyn ChatCompletionService>,
        memory: Arc<dyn SemanticMemory>,
        search: WebSearchClient,
        extractor: ContentExtractor,
    ) -> Result<Self> {
        let search = Arc::new(search);
        let extractor = Arc::new(extractor);

        let prompt_chat = Arc::new(MeteredChat::new(chat.clone()));

        let analyze =
            PromptFunction::analyze_content(prompt_chat.clone(), settings.model.clone())?
                .with_max_tokens(settings.prompt_max_tokens);
        let summarize = PromptFunction::create_summary(
            prompt_chat.clone(),
            memory.clone(),
            settings.model.clone(),
            &settings.collection,
        )?
        .with_max_tokens(settings.prompt_max_tokens)
        .with_recall_limit(settings.recall_limit);
        let summarize_papers =
            PromptFunction::summarize_research(prompt_chat.clone(), settings.model.clone())?
                .with_max_tokens(settings.prompt_max_tokens);

        let mut tools = ToolRegistry::new();
        tools.register(SearchWebTool::new(search.clone()));
        tools.register(ExtractContentTool::new(extractor.clone()));
        tools.register(SaveToMemoryTool::new(
            memory.clone(),
            settings.collection.clone(),
        ));
        tools.register(PromptFunctionTool::new(analyze));
        tools.register(PromptFunctionTool::new(summarize));
        tools.register(PromptFunctionTool::new(summarize_papers));

        info!(
            model = %settings.model,
            collection = %settings.collection,
            tools = tools.len(),
            "kernel assembled"
        );

        Ok(Self {
            settings,
            chat,
            prompt_chat,
            memory,
            search,
            extractor,
            tools,
        })
    }

    /// Assemble the OpenAI-backed kernel described by `config`
    pub fn from_config(config: &ResearchConfig) -> Result<Self> {
        config.validate()?;

        let chat_client = OpenAIClient::new(config.api_key.clone())
            .with_base_url(config.base_url.clone())
            .with_timeout(config.timeout);
        let embedding_client = OpenAIClient::new(config.api_key.clone())
            .with_base_url(config.embedding_base_url())
            .with_timeout(config.timeout);

        let memory = SemanticTextMemory::new(
            Arc::new(VolatileMemoryStore::new()),
            Arc::new(OpenAIEmbeddings::new(
                embedding_client,
                config.embedding_model.clone(),
            )),
        );

        let mut search = WebSearchClient::new(config.search_backend)
            .with_max_results(config.max_search_results)
            .with_timeout(config.timeout)?;
        if let Some(endpoint) = &config.search_endpoint {
            search = search.with_endpoint(endpoint.clone());
        }

        let extractor = ContentExtractor::new()
            .with_max_chars(config.extract_max_chars)
            .with_timeout(config.timeout)?;

        let settings = KernelSettings {
            model: config.model.clone(),
            collection: config.collection.clone(),
            recall_limit: config.recall_limit,
            ..KernelSettings::default()
        };

        Self::new(
            settings,
            Arc::new(chat_client),
            Arc::new(memory),
            search,
            extractor,
        )
    }

    pub fn settings(&self) -> &KernelSettings {
        &self.settings
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    pub fn collection(&self) -> &str {
        &self.settings.collection
    }

    pub fn chat(&self) -> &Arc<dyn ChatCompletionService> {
        &self.chat
    }

    /// Completion tokens reported to the kernel's prompt functions so far
    pub fn prompt_completion_tokens(&self) -> u64 {
        self.prompt_chat.completion_tokens()
    }

    pub fn memory(&self) -> &Arc<dyn SemanticMemory> {
        &self.memory
    }

    pub fn web_search(&self) -> &WebSearchClient {
        &self.search
    }

    pub fn extractor(&self) -> &ContentExtractor {
        &self.extractor
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run one capability directly, bypassing the planner
    pub async fn invoke(
        &self,
        capability: Capability,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value> {
        self.tools.execute(capability, arguments).await
    }
}

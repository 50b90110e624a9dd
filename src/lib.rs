//! web-research: an LLM planner that researches topics on the web
//!
//! A [`Kernel`] binds a chat completion service, semantic memory and the web
//! tools into a fixed set of capabilities. A [`Planner`] asks the model for a
//! plan, then drives those capabilities through function calling until the
//! model calls `final_answer`.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use web_research::{Kernel, Planner, ResearchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ResearchConfig::from_env()?;
//!     let kernel = Kernel::from_config(&config)?;
//!     let planner = Planner::from_config(&config);
//!
//!     let result = planner
//!         .invoke(&kernel, "Research recent breakthroughs in quantum error correction.")
//!         .await?;
//!     println!("{}", result.final_answer);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod driver;
pub mod error;
pub mod memory;
pub mod pipeline;
pub mod prompts;
pub mod schemas;
pub mod services;
pub mod tools;
pub mod types;

pub use config::ResearchConfig;
pub use core::{
    ChatCompletionService, ChatHistory, Kernel, KernelSettings, MeteredChat, Planner,
    PlannerOptions, PlannerResult, PlannerStep, TokenUsage,
};
pub use driver::{Driver, DriverReport, ResearchAssistant, ResearchRunner, DEFAULT_TASKS};
pub use error::{ExtractionError, ResearchError, Result};
pub use memory::{EmbeddingGenerator, SemanticMemory, SemanticTextMemory, VolatileMemoryStore};
pub use pipeline::{ArxivPipeline, ArxivReport, PipelineReport, ResearchPipeline};
pub use prompts::{PromptFunction, PromptTemplate};
pub use services::{OpenAIClient, OpenAIEmbeddings};
pub use tools::{
    ArxivClient, Capability, ContentExtractor, Paper, SearchBackend, SearchResult, Tool,
    ToolRegistry, WebSearchClient,
};

#[cfg(feature = "cli")]
pub mod cli;

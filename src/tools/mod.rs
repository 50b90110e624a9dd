//! Tool abstractions and the research tools exposed to the planner

pub mod arxiv;
pub mod content_extractor;
pub mod prompt_tools;
pub mod save_memory;
pub mod tool;
pub mod web_search;

pub use arxiv::{ArxivClient, Paper};
pub use content_extractor::{extract_text, ContentExtractor, ExtractContentTool, ExtractedDocument};
pub use prompt_tools::PromptFunctionTool;
pub use save_memory::SaveToMemoryTool;
pub use tool::{Capability, Tool, ToolRegistry};
pub use web_search::{SearchBackend, SearchResult, SearchWebTool, WebSearchClient};

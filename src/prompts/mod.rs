//! Prompt-templated functions and the template language they use

pub mod functions;
pub mod template;

pub use functions::{
    PromptFunction, ANALYZE_CONTENT_TEMPLATE, CREATE_SUMMARY_TEMPLATE, SUMMARIZE_RESEARCH_TEMPLATE,
};
pub use template::{PromptTemplate, TemplateArguments};

pub(crate) mod completion;
pub(crate) mod execution;
pub mod openai_client;
pub(crate) mod planning;
pub(crate) mod tool_call_utils;

pub use openai_client::{ChatCompletionRequest, OpenAIClient, OpenAIEmbeddings};

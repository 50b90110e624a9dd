use crate::{
    error::{ResearchError, Result},
    types::result::TokenUsage,
};
use serde_json::Value;

/// Pull the assistant message out of the first choice of a completion response
pub(crate) fn first_message(response: &Value) -> Result<Value> {
    let choices = response
        .get("choices")
        .and_then(|value| value.as_array())
        .ok_or_else(|| {
            ResearchError::Unknown("Missing 'choices' array in completion response".to_string())
        })?;

    let first_choice = choices.first().ok_or_else(|| {
        ResearchError::Unknown("Completion response contained no choices".to_string())
    })?;

    first_choice.get("message").cloned().ok_or_else(|| {
        ResearchError::Unknown("Completion response missing assistant message".to_string())
    })
}

pub(crate) fn token_usage(response: &Value) -> Option<TokenUsage> {
    let usage = response.get("usage")?;
    Some(TokenUsage {
        prompt_tokens: usage.get("prompt_tokens")?.as_u64()? as u32,
        completion_tokens: usage.get("completion_tokens")?.as_u64()? as u32,
        total_tokens: usage.get("total_tokens")?.as_u64()? as u32,
    })
}

/// Text content of an assistant message, trimmed; empty when absent
pub(crate) fn message_content(message: &Value) -> String {
    message
        .get("content")
        .and_then(|value| value.as_str())
        .unwrap_or("")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_message_and_usage() {
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": "  hello "}}],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
        });
        let message = first_message(&response).unwrap();
        assert_eq!(message_content(&message), "hello");
        let usage = token_usage(&response).unwrap();
        assert_eq!(usage.completion_tokens, 2);
        assert_eq!(usage.total_tokens, 7);
    }

    #[test]
    fn empty_choices_is_an_error() {
        let response = json!({"choices": []});
        assert!(first_message(&response).is_err());
        assert!(token_usage(&response).is_none());
    }
}

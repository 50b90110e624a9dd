use crate::error::ResearchError;
use serde_json::Value;

/// Extract tool_call_id from a tool call JSON object
pub(super) fn extract_tool_call_id(tool_call: &Value) -> &str {
    tool_call
        .get("id")
        .and_then(|value| value.as_str())
        .unwrap_or_default()
}

/// Extract function name from a tool call JSON object
pub(super) fn extract_function_info(tool_call: &Value) -> Option<(Value, Option<String>)> {
    let function = tool_call.get("function").cloned()?;
    let function_name = function
        .get("name")
        .and_then(|value| value.as_str())
        .map(|s| s.to_string());
    Some((function, function_name))
}

/// Parse function arguments from JSON string; an empty string means no arguments
pub(super) fn parse_function_arguments(
    arguments_str: &str,
    function_name: &str,
) -> Result<Value, ResearchError> {
    if arguments_str.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(arguments_str).map_err(|err| {
        ResearchError::InvalidFunctionCall(format!(
            "Failed to parse arguments for tool '{}': {}",
            function_name, err
        ))
    })
}

/// Extract arguments string from function object
pub(super) fn extract_arguments_str(function: &Value) -> &str {
    function
        .get("arguments")
        .and_then(|value| value.as_str())
        .unwrap_or("")
}

/// True when any call in the turn targets `name`
pub(super) fn turn_calls(tool_calls: &[Value], name: &str) -> bool {
    tool_calls.iter().any(|tool_call| {
        tool_call
            .get("function")
            .and_then(|f| f.get("name"))
            .and_then(|value| value.as_str())
            .map(|value| value == name)
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_call_parts() {
        let call = json!({
            "id": "call_1",
            "type": "function",
            "function": {"name": "web-SearchWeb", "arguments": "{\"query\":\"rust\"}"}
        });
        assert_eq!(extract_tool_call_id(&call), "call_1");
        let (function, name) = extract_function_info(&call).unwrap();
        assert_eq!(name.as_deref(), Some("web-SearchWeb"));
        let args = parse_function_arguments(extract_arguments_str(&function), "web-SearchWeb")
            .unwrap();
        assert_eq!(args["query"], "rust");
        assert!(turn_calls(&[call], "web-SearchWeb"));
    }

    #[test]
    fn malformed_arguments_are_invalid_calls() {
        let err = parse_function_arguments("{not json", "x").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_FUNCTION_CALL");
        assert!(parse_function_arguments("", "x").unwrap().is_object());
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single entry in the planner's trace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlannerStep {
    /// Research task as given by the driver
    Task { content: String },
    /// Plan the model produced before calling any tools
    Planning { plan: String },
    /// Tool call requested by the model
    Action {
        tool_name: String,
        tool_call_id: String,
        arguments: Value,
    },
    /// Result of a tool call
    Observation {
        tool_call_id: String,
        result: String,
        is_error: bool,
    },
    /// Instruction sent back to the model when its reply could not be used
    Correction { message: String },
    /// Final answer from the planner
    FinalAnswer { answer: String },
}

impl PlannerStep {
    /// Convert step to OpenAI message format
    pub fn to_message(&self) -> Value {
        match self {
            PlannerStep::Task { content } => {
                serde_json::json!({
                    "role": "user",
                    "content": content
                })
            }
            PlannerStep::Planning { plan } => {
                serde_json::json!({
                    "role": "assistant",
                    "content": plan
                })
            }
            PlannerStep::Action {
                tool_name,
                tool_call_id,
                arguments,
            } => {
                serde_json::json!({
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": tool_call_id,
                        "type": "function",
                        "function": {
                            "name": tool_name,
                            "arguments": arguments_text(arguments)
                        }
                    }]
                })
            }
            PlannerStep::Observation {
                tool_call_id,
                result,
                ..
            } => {
                serde_json::json!({
                    "role": "tool",
                    "tool_call_id": tool_call_id,
                    "content": result
                })
            }
            PlannerStep::Correction { message } => {
                serde_json::json!({
                    "role": "system",
                    "content": message
                })
            }
            PlannerStep::FinalAnswer { answer } => {
                serde_json::json!({
                    "role": "assistant",
                    "content": answer
                })
            }
        }
    }

    /// Get a human-readable description of the step
    pub fn describe(&self) -> String {
        match self {
            PlannerStep::Task { content } => format!("Task: {}", content.trim()),
            PlannerStep::Planning { plan } => format!("Plan: {}", plan),
            PlannerStep::Action {
                tool_name,
                arguments,
                ..
            } => format!("Action: {}({})", tool_name, arguments),
            PlannerStep::Observation {
                result, is_error, ..
            } => {
                if *is_error {
                    format!("Error: {}", result)
                } else {
                    format!("Observation: {}", result)
                }
            }
            PlannerStep::Correction { message } => format!("Correction: {}", message),
            PlannerStep::FinalAnswer { answer } => format!("Final Answer: {}", answer),
        }
    }
}

/// Arguments as the model sent them. Text that failed to parse is kept
/// verbatim rather than re-encoded as a JSON string.
fn arguments_text(arguments: &Value) -> String {
    match arguments {
        Value::String(raw) => raw.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_becomes_tool_call_message() {
        let step = PlannerStep::Action {
            tool_name: "web-SearchWeb".to_string(),
            tool_call_id: "call_1".to_string(),
            arguments: serde_json::json!({"query": "rust"}),
        };
        let message = step.to_message();
        assert_eq!(message["role"], "assistant");
        assert_eq!(message["tool_calls"][0]["function"]["name"], "web-SearchWeb");
        assert_eq!(
            message["tool_calls"][0]["function"]["arguments"],
            "{\"query\":\"rust\"}"
        );
    }

    #[test]
    fn unparsed_arguments_are_replayed_verbatim() {
        let step = PlannerStep::Action {
            tool_name: "web-SearchWeb".to_string(),
            tool_call_id: "call_2".to_string(),
            arguments: Value::String("{\"query\": ".to_string()),
        };
        assert_eq!(
            step.to_message()["tool_calls"][0]["function"]["arguments"],
            "{\"query\": "
        );
    }

    #[test]
    fn describe_marks_errors() {
        let step = PlannerStep::Observation {
            tool_call_id: "1".to_string(),
            result: "boom".to_string(),
            is_error: true,
        };
        assert_eq!(step.describe(), "Error: boom");
    }
}

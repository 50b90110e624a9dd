use crate::tools::ToolRegistry;
use serde_json::{json, Value};

pub(crate) const FINAL_ANSWER_TOOL_NAME: &str = "final_answer";

/// System prompt for the function-calling phase
pub(crate) const EXECUTION_SYSTEM_PROMPT: &str = "You are a research assistant working through a task with the tools provided. \
Follow the plan you wrote and call tools to gather, store and analyze information; never invent tool results. \
When you are ready to give the final response, you MUST call the `final_answer` tool with an `answer` string instead of replying directly.";

/// Prompt asking the model for a plan before any tool is called
pub(crate) fn generate_tool_planning_prompt(task: &str, tools: &ToolRegistry) -> String {
    let tool_descriptions: Vec<String> = tools
        .capabilities()
        .into_iter()
        .map(|capability| {
            format!(
                "- {}: {}",
                capability.qualified_name(),
                capability.description()
            )
        })
        .collect();

    if tool_descriptions.is_empty() {
        format!(
            "Task: {}\n\nHow would you approach solving this?",
            task.trim()
        )
    } else {
        format!(
            "Task: {}\n\nAvailable tools:\n{}\n\nThink step-by-step and write a short numbered plan \
             naming the tools you will call. Do not call any tools yet.",
            task.trim(),
            tool_descriptions.join("\n")
        )
    }
}

/// Tool definition the model calls to finish
pub(crate) fn final_answer_tool_definition() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": FINAL_ANSWER_TOOL_NAME,
            "description": "Signal that the research task is complete by providing the final answer.",
            "parameters": {
                "type": "object",
                "properties": {
                    "answer": {
                        "type": "string",
                        "description": "Final response for the user"
                    }
                },
                "required": ["answer"]
            }
        }
    })
}

/// Correction sent when the model replies in plain text instead of finishing
pub(crate) fn final_answer_reminder(answer: &str) -> String {
    if answer.is_empty() {
        format!(
            "Assistant must call the `{}` tool to conclude the task, but returned no content.",
            FINAL_ANSWER_TOOL_NAME
        )
    } else {
        format!(
            "Assistant must call the `{}` tool to conclude the task. Received plain response: {}",
            FINAL_ANSWER_TOOL_NAME, answer
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planning_prompt_without_tools() {
        let prompt = generate_tool_planning_prompt("  Test task  ", &ToolRegistry::new());
        assert!(prompt.starts_with("Task: Test task\n"));
        assert!(prompt.contains("How would you approach"));
    }

    #[test]
    fn final_answer_tool_requires_answer() {
        let definition = final_answer_tool_definition();
        assert_eq!(definition["function"]["name"], "final_answer");
        assert_eq!(definition["function"]["parameters"]["required"][0], "answer");
    }

    #[test]
    fn reminder_quotes_plain_reply() {
        assert!(final_answer_reminder("hi").ends_with("Received plain response: hi"));
        assert!(final_answer_reminder("").contains("returned no content"));
    }

    #[test]
    fn system_prompt_names_final_answer_tool() {
        assert!(EXECUTION_SYSTEM_PROMPT.contains(&format!("`{}`", FINAL_ANSWER_TOOL_NAME)));
    }
}

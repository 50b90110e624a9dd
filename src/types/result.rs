use crate::core::steps::PlannerStep;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of one planner invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerResult {
    /// Final answer given by the model
    pub final_answer: String,
    /// Every step recorded while solving the task
    pub chat_history: Vec<PlannerStep>,
    /// Tokens consumed across all requests (if the API reported usage)
    pub tokens: Option<TokenUsage>,
    pub duration: Duration,
    /// Function-calling turns used
    pub iterations: usize,
}

/// Token usage information from the API
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

impl PlannerResult {
    /// One line per trace entry, as printed under "Thought Process"
    pub fn thoughts(&self) -> Vec<String> {
        self.chat_history.iter().map(|step| step.describe()).collect()
    }

    /// Generate a human-readable replay of the execution
    pub fn replay(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Research Trace ===".to_string());
        lines.push(format!("Duration: {:.2}s", self.duration.as_secs_f64()));
        lines.push(format!("Iterations: {}", self.iterations));

        if let Some(tokens) = &self.tokens {
            lines.push(format!(
                "Tokens: {} prompt + {} completion = {} total",
                tokens.prompt_tokens, tokens.completion_tokens, tokens.total_tokens
            ));
        }

        lines.push(String::new());
        lines.push("--- Steps ---".to_string());

        for (idx, step) in self.chat_history.iter().enumerate() {
            lines.push(format!("{}. {}", idx + 1, step.describe()));
        }

        lines.push(String::new());
        lines.push("--- Final Answer ---".to_string());
        lines.push(self.final_answer.clone());

        lines.join("\n")
    }

    /// Get count of actions (tool calls) executed
    pub fn action_count(&self) -> usize {
        self.chat_history
            .iter()
            .filter(|s| matches!(s, PlannerStep::Action { .. }))
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.chat_history
            .iter()
            .filter(|s| matches!(s, PlannerStep::Observation { is_error: true, .. }))
            .count()
    }

    /// Names of the tools called, in call order
    pub fn tools_used(&self) -> Vec<&str> {
        self.chat_history
            .iter()
            .filter_map(|step| match step {
                PlannerStep::Action { tool_name, .. } => Some(tool_name.as_str()),
                _ => None,
            })
            .collect()
    }
}

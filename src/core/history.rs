use super::steps::PlannerStep;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Planner conversation: the system prompt plus every recorded step,
/// convertible to OpenAI messages for the next request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistory {
    steps: Vec<PlannerStep>,
    system_prompt: Option<String>,
}

impl ChatHistory {
    pub fn new(system_prompt: Option<String>) -> Self {
        Self {
            steps: Vec::new(),
            system_prompt,
        }
    }

    /// Add a step, logging it under `web_research::steps`
    pub fn add_step(&mut self, step: PlannerStep) {
        info!(target: "web_research::steps", "{}", step.describe());
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[PlannerStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<PlannerStep> {
        self.steps
    }

    pub fn last_step(&self) -> Option<&PlannerStep> {
        self.steps.last()
    }

    /// Convert history to OpenAI message format
    pub fn as_messages(&self) -> Vec<Value> {
        let mut messages = Vec::with_capacity(self.steps.len() + 1);

        if let Some(system_prompt) = &self.system_prompt {
            messages.push(serde_json::json!({
                "role": "system",
                "content": system_prompt
            }));
        }

        for step in &self.steps {
            messages.push(step.to_message());
        }

        messages
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn count_actions(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, PlannerStep::Action { .. }))
            .count()
    }

    pub fn count_observations(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, PlannerStep::Observation { .. }))
            .count()
    }
}

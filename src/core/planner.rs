use crate::config::{ResearchConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_TOKENS};
use std::time::Duration;

/// Limits for one planner invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerOptions {
    /// Function-calling turns allowed after the plan is made
    pub max_iterations: usize,
    /// Completion tokens allowed across every request of the invocation
    pub max_tokens: u32,
    /// Timeout for a single completion request
    pub request_timeout: Duration,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Stepwise planner: writes a plan, then drives the kernel's tools through
/// function calling until the model calls `final_answer`.
///
/// See [`Planner::invoke`].
#[derive(Debug, Clone, Default)]
pub struct Planner {
    options: PlannerOptions,
}

impl Planner {
    pub fn new(options: PlannerOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &ResearchConfig) -> Self {
        Self::new(PlannerOptions {
            max_iterations: config.max_iterations,
            max_tokens: config.max_tokens,
            request_timeout: config.timeout,
        })
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.options.max_iterations = max_iterations;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = max_tokens;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.options.request_timeout = timeout;
        self
    }

    pub fn options(&self) -> &PlannerOptions {
        &self.options
    }
}

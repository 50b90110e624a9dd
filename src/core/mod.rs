pub mod history;
pub mod kernel;
pub mod planner;
pub mod service;
pub mod steps;

pub use crate::types::result::{PlannerResult, TokenUsage};
pub use history::ChatHistory;
pub use kernel::{Kernel, KernelSettings};
pub use planner::{Planner, PlannerOptions};
pub use service::{ChatCompletionService, MeteredChat};
pub use steps::PlannerStep;

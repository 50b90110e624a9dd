pub mod result;

pub use result::{PlannerResult, TokenUsage};

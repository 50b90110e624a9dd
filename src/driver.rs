//! Runs a list of research tasks through the planner and prints the results.

use crate::{
    core::{Kernel, Planner},
    error::Result,
    types::result::PlannerResult,
};
use async_trait::async_trait;
use std::io::Write;
use tracing::{error, info};

/// Research tasks run when none are supplied
pub const DEFAULT_TASKS: [&str; 2] = [
    "Research the latest developments in quantum computing.\n\
     Focus on recent breakthroughs in error correction.\n\
     Analyze the information and create a summary.",
    "Find information about artificial intelligence in healthcare.\n\
     Focus on recent applications in diagnostic imaging.\n\
     Create a summary of the findings.",
];

const SEPARATOR_WIDTH: usize = 80;

/// Anything that can turn a task into a planner result
#[async_trait]
pub trait ResearchRunner: Send + Sync {
    async fn conduct_research(&self, task: &str) -> Result<PlannerResult>;
}

/// A kernel paired with the planner that drives it
#[derive(Debug)]
pub struct ResearchAssistant {
    kernel: Kernel,
    planner: Planner,
}

impl ResearchAssistant {
    pub fn new(kernel: Kernel, planner: Planner) -> Self {
        Self { kernel, planner }
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }
}

#[async_trait]
impl ResearchRunner for ResearchAssistant {
    async fn conduct_research(&self, task: &str) -> Result<PlannerResult> {
        self.planner.invoke(&self.kernel, task).await
    }
}

/// Totals for one driver run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl DriverReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Feeds tasks to a [`ResearchRunner`] one at a time
#[derive(Debug, Clone)]
pub struct Driver {
    tasks: Vec<String>,
}

impl Default for Driver {
    fn default() -> Self {
        Self::new(DEFAULT_TASKS.iter().map(|task| task.to_string()).collect())
    }
}

impl Driver {
    pub fn new(tasks: Vec<String>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    /// Run every task in order, writing results to `out`.
    ///
    /// A failed task prints a single `Error during research:` line and the
    /// loop moves on; only write failures abort the run.
    pub async fn run<R, W>(&self, runner: &R, out: &mut W) -> std::io::Result<DriverReport>
    where
        R: ResearchRunner + ?Sized,
        W: Write,
    {
        let mut report = DriverReport::default();

        for (index, task) in self.tasks.iter().enumerate() {
            let task = task.trim();
            info!(task = index + 1, total = self.tasks.len(), "starting research task");

            writeln!(out, "\nResearch Task: {}\n", task)?;
            writeln!(out, "Starting research process...")?;

            match runner.conduct_research(task).await {
                Ok(result) => {
                    report.succeeded += 1;
                    write_result(out, &result)?;
                }
                Err(err) => {
                    report.failed += 1;
                    error!(task = index + 1, "research task failed: {}", err);
                    writeln!(out, "Error during research: {}", single_line(&err.to_string()))?;
                }
            }

            writeln!(out, "\n{}\n", "=".repeat(SEPARATOR_WIDTH))?;
        }

        Ok(report)
    }
}

/// Provider errors can embed multi-line response bodies
fn single_line(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn write_result<W: Write>(out: &mut W, result: &PlannerResult) -> std::io::Result<()> {
    writeln!(out, "\nResearch Results:")?;
    writeln!(out, "{}", result.final_answer)?;
    writeln!(out, "\nThought Process:")?;
    for thought in result.thoughts() {
        writeln!(out, "- {}", thought)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tasks_are_loaded() {
        let driver = Driver::default();
        assert_eq!(driver.tasks().len(), 2);
        assert!(driver.tasks()[0].contains("quantum computing"));
        assert!(driver.tasks()[1].contains("diagnostic imaging"));
    }

    #[test]
    fn multi_line_errors_collapse_to_one_line() {
        assert_eq!(
            single_line("HTTP 400 error: {\n  \"detail\": \"model not found\"\n}"),
            "HTTP 400 error: { \"detail\": \"model not found\" }"
        );
    }
}

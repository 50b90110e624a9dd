use async_trait::async_trait;
use std::time::Duration;
use web_research::{
    error::Result, Driver, PlannerResult, PlannerStep, ResearchError, ResearchRunner,
};

#[derive(Debug)]
struct FakeRunner;

#[async_trait]
impl ResearchRunner for FakeRunner {
    async fn conduct_research(&self, task: &str) -> Result<PlannerResult> {
        if task.contains("provider") {
            return Err(ResearchError::Unknown(
                "HTTP 404 error: {\n  \"error\": \"model not found\"\n}".to_string(),
            ));
        }
        if task.contains("fail") {
            return Err(ResearchError::Search("search backend unavailable".to_string()));
        }
        Ok(PlannerResult {
            final_answer: format!("answer for {}", task),
            chat_history: vec![
                PlannerStep::Task {
                    content: task.to_string(),
                },
                PlannerStep::FinalAnswer {
                    answer: format!("answer for {}", task),
                },
            ],
            tokens: None,
            duration: Duration::from_millis(5),
            iterations: 1,
        })
    }
}

#[tokio::test]
async fn failed_task_does_not_stop_the_run() {
    let driver = Driver::new(vec![
        "first topic".to_string(),
        "this one will fail".to_string(),
        "third topic".to_string(),
    ]);
    let mut out = Vec::new();

    let report = driver.run(&FakeRunner, &mut out).await.unwrap();
    let output = String::from_utf8(out).unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.total(), 3);
    assert_eq!(output.matches("Research Task:").count(), 3);
    assert_eq!(output.matches("Research Results:").count(), 2);
    assert_eq!(output.matches("Error during research:").count(), 1);
    assert!(output.contains("Error during research: Search error: search backend unavailable"));
    assert!(output.contains("answer for third topic"));
}

#[tokio::test]
async fn results_include_thought_process_and_separator() {
    let driver = Driver::new(vec!["  topic  ".to_string()]);
    let mut out = Vec::new();

    driver.run(&FakeRunner, &mut out).await.unwrap();
    let output = String::from_utf8(out).unwrap();

    assert!(output.starts_with("\nResearch Task: topic\n\nStarting research process...\n"));
    assert!(output.contains("\nThought Process:\n- Task: topic\n- Final Answer: answer for topic\n"));
    assert!(output.ends_with(&format!("\n{}\n\n", "=".repeat(80))));
}

#[tokio::test]
async fn multi_line_error_prints_one_line() {
    let driver = Driver::new(vec!["ask the provider".to_string()]);
    let mut out = Vec::new();

    let report = driver.run(&FakeRunner, &mut out).await.unwrap();
    let output = String::from_utf8(out).unwrap();

    assert_eq!(report.failed, 1);
    let error_lines: Vec<&str> = output
        .lines()
        .filter(|line| line.starts_with("Error during research:"))
        .collect();
    assert_eq!(error_lines.len(), 1);
    assert!(error_lines[0].contains("\"error\": \"model not found\" }"));
    assert!(!output.lines().any(|line| line.trim() == "}"));
}

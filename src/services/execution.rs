use crate::{
    core::{
        history::ChatHistory,
        kernel::Kernel,
        planner::Planner,
        steps::PlannerStep,
    },
    error::{ResearchError, Result},
    services::{
        completion::{first_message, message_content, token_usage},
        openai_client::ChatCompletionRequest,
        planning::{
            final_answer_reminder, final_answer_tool_definition, generate_tool_planning_prompt,
            EXECUTION_SYSTEM_PROMPT, FINAL_ANSWER_TOOL_NAME,
        },
        tool_call_utils::{
            extract_arguments_str, extract_function_info, extract_tool_call_id,
            parse_function_arguments, turn_calls,
        },
    },
    types::result::{PlannerResult, TokenUsage},
};
use serde_json::{json, Value};
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Completion tokens spent so far against the planner's budget
#[derive(Debug)]
struct TokenBudget {
    limit: u32,
    used: u32,
    usage: Option<TokenUsage>,
}

impl TokenBudget {
    fn new(limit: u32) -> Self {
        Self {
            limit,
            used: 0,
            usage: None,
        }
    }

    fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }

    /// Charge completion tokens spent by prompt functions a tool call ran
    fn charge(&mut self, completion_tokens: u64) {
        if completion_tokens == 0 {
            return;
        }
        let tokens = u32::try_from(completion_tokens).unwrap_or(u32::MAX);
        self.record(Some(TokenUsage {
            prompt_tokens: 0,
            completion_tokens: tokens,
            total_tokens: tokens,
        }));
    }

    fn record(&mut self, usage: Option<TokenUsage>) {
        match usage {
            Some(usage) => {
                self.used = self.used.saturating_add(usage.completion_tokens);
                self.usage.get_or_insert_with(TokenUsage::default).add(&usage);
            }
            None => debug!("completion response carried no usage; budget not charged"),
        }
    }
}

impl Planner {
    /// Solve `task` with the tools registered on `kernel`.
    ///
    /// One planning request is made first, then up to `max_iterations`
    /// function-calling turns. Tool failures are fed back to the model as
    /// error observations; only transport failures, an exhausted token
    /// budget or running out of iterations end the invocation with an error.
    pub async fn invoke(&self, kernel: &Kernel, task: &str) -> Result<PlannerResult> {
        let start_time = Instant::now();
        let options = *self.options();
        let mut budget = TokenBudget::new(options.max_tokens);
        let mut history = ChatHistory::new(Some(EXECUTION_SYSTEM_PROMPT.to_string()));

        history.add_step(PlannerStep::Task {
            content: task.trim().to_string(),
        });

        let plan = self.make_plan(kernel, task, &mut budget).await?;
        history.add_step(PlannerStep::Planning { plan });

        let mut iteration = 0;
        while iteration < options.max_iterations {
            iteration += 1;

            let remaining = budget.remaining();
            if remaining == 0 {
                return Err(ResearchError::TokenBudget(options.max_tokens));
            }

            let mut tools = kernel.tools().to_openai_tools();
            tools.push(final_answer_tool_definition());

            let request_body = ChatCompletionRequest::new(kernel.model(), history.as_messages())
                .with_tools(tools)
                .with_tool_choice(json!("auto"))
                .with_max_tokens(Some(remaining))
                .into_value();

            let response = self.complete(kernel, &request_body).await?;
            budget.record(token_usage(&response));
            let assistant_message = first_message(&response)?;

            let tool_calls = assistant_message
                .get("tool_calls")
                .and_then(|value| value.as_array())
                .filter(|calls| !calls.is_empty());

            let Some(tool_calls) = tool_calls else {
                let answer = message_content(&assistant_message);
                history.add_step(PlannerStep::Correction {
                    message: final_answer_reminder(&answer),
                });
                continue;
            };

            if turn_calls(tool_calls, FINAL_ANSWER_TOOL_NAME) && tool_calls.len() > 1 {
                history.add_step(PlannerStep::Correction {
                    message: format!(
                        "`{}` must be the only tool call in a single turn",
                        FINAL_ANSWER_TOOL_NAME
                    ),
                });
                continue;
            }

            for tool_call in tool_calls {
                let tool_call_id = extract_tool_call_id(tool_call).to_string();

                let Some((function, Some(function_name))) = extract_function_info(tool_call)
                    .filter(|(_, name)| name.as_deref().is_some_and(|name| !name.is_empty()))
                else {
                    history.add_step(PlannerStep::Correction {
                        message: format!(
                            "Tool call '{}' is missing its function name; call tools by name",
                            tool_call_id
                        ),
                    });
                    continue;
                };

                let arguments_str = extract_arguments_str(&function);
                let parsed_arguments = parse_function_arguments(arguments_str, &function_name);

                if function_name == FINAL_ANSWER_TOOL_NAME {
                    let answer = parsed_arguments
                        .ok()
                        .and_then(|args| {
                            args.get("answer")
                                .and_then(|value| value.as_str())
                                .map(|value| value.trim().to_string())
                        })
                        .filter(|answer| !answer.is_empty());

                    match answer {
                        Some(answer) => {
                            history.add_step(PlannerStep::FinalAnswer {
                                answer: answer.clone(),
                            });
                            info!(
                                iterations = iteration,
                                elapsed = ?start_time.elapsed(),
                                "research task completed"
                            );
                            return Ok(PlannerResult {
                                final_answer: answer,
                                chat_history: history.into_steps(),
                                tokens: budget.usage,
                                duration: start_time.elapsed(),
                                iterations: iteration,
                            });
                        }
                        None => {
                            history.add_step(PlannerStep::Correction {
                                message: format!(
                                    "`{}` requires a non-empty `answer` string",
                                    FINAL_ANSWER_TOOL_NAME
                                ),
                            });
                            continue;
                        }
                    }
                }

                let arguments = match &parsed_arguments {
                    Ok(value) => value.clone(),
                    Err(_) => Value::String(arguments_str.to_string()),
                };
                history.add_step(PlannerStep::Action {
                    tool_name: function_name.clone(),
                    tool_call_id: tool_call_id.clone(),
                    arguments,
                });

                let prompt_tokens_before = kernel.prompt_completion_tokens();
                let outcome = match parsed_arguments {
                    Ok(arguments_json) => {
                        kernel
                            .tools()
                            .execute_function(&function_name, arguments_json)
                            .await
                    }
                    Err(error) => Err(error),
                };
                budget.charge(
                    kernel
                        .prompt_completion_tokens()
                        .saturating_sub(prompt_tokens_before),
                );

                let (result, is_error) = match outcome {
                    Ok(value) => (observation_text(value), false),
                    Err(error) => {
                        warn!(tool = %function_name, "tool call failed: {}", error);
                        (error_observation_text(&error), true)
                    }
                };

                history.add_step(PlannerStep::Observation {
                    tool_call_id,
                    result,
                    is_error,
                });
            }
        }

        Err(ResearchError::MaxIterations(options.max_iterations))
    }

    async fn make_plan(&self, kernel: &Kernel, task: &str, budget: &mut TokenBudget) -> Result<String> {
        let prompt = generate_tool_planning_prompt(task, kernel.tools());
        let request_body = ChatCompletionRequest::new(
            kernel.model(),
            vec![json!({
                "role": "user",
                "content": prompt
            })],
        )
        .with_max_tokens(Some(budget.remaining()))
        .into_value();

        let response = self.complete(kernel, &request_body).await?;
        budget.record(token_usage(&response));

        let plan = message_content(&first_message(&response)?);
        Ok(if plan.is_empty() {
            "No plan was produced; proceed directly with the tools.".to_string()
        } else {
            plan
        })
    }

    async fn complete(&self, kernel: &Kernel, request_body: &Value) -> Result<Value> {
        timeout(
            self.options().request_timeout,
            kernel.chat().complete(request_body),
        )
        .await
        .map_err(|_| ResearchError::Timeout("Chat completion call timed out".to_string()))?
    }
}

/// Tool output as shown to the model: strings verbatim, everything else as JSON
fn observation_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Failed extractions keep their plain `Error extracting content:` message;
/// every other failure is sent as the structured error payload
fn error_observation_text(error: &ResearchError) -> String {
    match error {
        ResearchError::Extraction(_) => error.to_string(),
        other => other.to_error_payload().to_string(),
    }
}

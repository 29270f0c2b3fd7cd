//! The agent loop

use futures::future::join_all;
use std::sync::Arc;

use aida_core::{Error, LLMProvider, Message, Result, Role, ToolCall};
use aida_tools::ToolRegistry;

use crate::config::{AgentConfig, IterationLimitPolicy};
use crate::observer::AgentObserver;

/// Answer used when the cap is hit before the LLM produced any text
pub const ITERATION_LIMIT_MESSAGE: &str = "Agent stopped due to iteration limit.";

/// Result of one user turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Final answer shown to the user
    pub answer: String,
    /// Messages produced by this turn, starting with the human message
    pub new_messages: Vec<Message>,
    /// Number of LLM invocations
    pub iterations: usize,
    pub hit_iteration_limit: bool,
}

enum AgentState {
    AwaitingLlm,
    AwaitingToolResults(Vec<ToolCall>),
    Done(String),
}

/// Tool-calling agent bound to one LLM and one tool registry
pub struct Agent {
    llm: Arc<dyn LLMProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    pub fn new(llm: Arc<dyn LLMProvider>, tools: Arc<ToolRegistry>, config: AgentConfig) -> Self {
        Self { llm, tools, config }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn llm(&self) -> &Arc<dyn LLMProvider> {
        &self.llm
    }

    /// Run one turn on top of `history`
    ///
    /// System messages in `history` are replaced by the profile's prompt.
    /// Tool failures are handed to the LLM as error text; only LLM failures
    /// and, under [`IterationLimitPolicy::Fail`], the iteration cap end the
    /// turn with an error.
    pub async fn run_turn(
        &self,
        history: &[Message],
        input: &str,
        observer: &dyn AgentObserver,
    ) -> Result<TurnOutcome> {
        let mut conversation = Vec::with_capacity(history.len() + 4);
        conversation.push(Message::system(self.config.profile.system_prompt()));
        conversation.extend(history.iter().filter(|m| m.role != Role::System).cloned());
        let turn_start = conversation.len();
        conversation.push(Message::human(input));

        let specs = self.tools.specs();
        let mut iterations = 0;
        let mut last_text: Option<String> = None;
        let mut state = AgentState::AwaitingLlm;

        loop {
            state = match state {
                AgentState::AwaitingLlm => {
                    if iterations >= self.config.max_iterations {
                        return self.stop_at_limit(conversation, turn_start, iterations, last_text);
                    }
                    iterations += 1;
                    tracing::debug!(iteration = iterations, messages = conversation.len(), "invoking LLM");

                    let response = self.llm.chat(&conversation, &specs).await?;
                    if !response.content.trim().is_empty() {
                        last_text = Some(response.content.clone());
                    }
                    let calls = response.tool_calls.clone();
                    let content = response.content.clone();
                    conversation.push(response);

                    if calls.is_empty() {
                        AgentState::Done(content)
                    } else {
                        AgentState::AwaitingToolResults(calls)
                    }
                }
                AgentState::AwaitingToolResults(calls) => {
                    let results = join_all(calls.iter().map(|call| async move {
                        observer.on_tool_start(&call.name);
                        let output = self.tools.execute(call).await;
                        observer.on_tool_finish(&call.name, output.is_error);
                        output
                    }))
                    .await;

                    for (call, output) in calls.iter().zip(results) {
                        conversation.push(Message::tool(&call.id, &call.name, output.content));
                    }
                    observer.on_analysing();
                    AgentState::AwaitingLlm
                }
                AgentState::Done(answer) => {
                    return Ok(TurnOutcome {
                        answer,
                        new_messages: conversation.split_off(turn_start),
                        iterations,
                        hit_iteration_limit: false,
                    });
                }
            };
        }
    }

    fn stop_at_limit(
        &self,
        mut conversation: Vec<Message>,
        turn_start: usize,
        iterations: usize,
        last_text: Option<String>,
    ) -> Result<TurnOutcome> {
        tracing::warn!(iterations, policy = ?self.config.on_iteration_limit, "iteration limit reached");
        match self.config.on_iteration_limit {
            IterationLimitPolicy::Fail => Err(Error::IterationLimit(iterations)),
            IterationLimitPolicy::BestEffort => {
                let answer = last_text.unwrap_or_else(|| ITERATION_LIMIT_MESSAGE.to_string());
                conversation.push(Message::ai(answer.clone()));
                Ok(TurnOutcome {
                    answer,
                    new_messages: conversation.split_off(turn_start),
                    iterations,
                    hit_iteration_limit: true,
                })
            }
        }
    }
}

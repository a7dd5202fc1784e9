//! The agent execution loop
//!
//! One `run` is one instruction driven to completion: complete against the
//! LLM with the run's toolset, surface the reasoning step, execute any
//! requested tool calls, feed results back, repeat until the model stops
//! calling tools. Every step is pushed into the run's event channel before
//! the next completion is requested, so long-running disbursements show
//! progress instead of appearing to hang.
//!
//! Failures are terminal for the run: the caller surfaces a single `error`
//! event and nothing is retried here.

use std::sync::Arc;

use tokio::sync::mpsc;

use zkredeem_llm::{CompletionRequest, LlmProvider, Message};
use zkredeem_types::{AgentEvent, RedeemError, Result};

use crate::thread::ThreadStore;
use crate::tool::ToolRegistry;

/// Upper bound on completion rounds per run; a model that keeps calling
/// tools past this is cut off.
const DEFAULT_MAX_STEPS: usize = 8;

/// Drives the LLM capability through tool-enabled runs.
pub struct AgentRuntime {
    provider: Arc<dyn LlmProvider>,
    threads: Arc<ThreadStore>,
    max_steps: usize,
}

impl AgentRuntime {
    pub fn new(provider: Arc<dyn LlmProvider>, threads: Arc<ThreadStore>) -> Self {
        Self {
            provider,
            threads,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn threads(&self) -> &Arc<ThreadStore> {
        &self.threads
    }

    /// Execute one instruction on the given thread with the given toolset,
    /// emitting each step into `sink` as it is produced.
    pub async fn run(
        &self,
        thread_id: &str,
        system: &str,
        input: &str,
        tools: &ToolRegistry,
        sink: &mpsc::Sender<AgentEvent>,
    ) -> Result<()> {
        self.threads.append(thread_id, Message::user(input));

        for step in 0..self.max_steps {
            let request = CompletionRequest::new(self.threads.history(thread_id))
                .with_system(system.to_string())
                .with_tools(tools.specs());

            let response = self
                .provider
                .complete(request)
                .await
                .map_err(|e| RedeemError::Llm(e.to_string()))?;

            self.threads.append(
                thread_id,
                Message::assistant_with_calls(response.content.clone(), response.tool_calls.clone()),
            );

            if !response.content.is_empty() {
                send(sink, AgentEvent::agent(response.content)).await?;
            }

            if response.tool_calls.is_empty() {
                return Ok(());
            }

            for call in response.tool_calls {
                let tool = tools.get(&call.name).ok_or_else(|| {
                    RedeemError::AgentExecution(format!("unknown tool: {}", call.name))
                })?;

                tracing::debug!(thread = thread_id, tool = %call.name, step, "executing tool");
                let output = tool
                    .execute(call.arguments)
                    .await
                    .map_err(|e| RedeemError::AgentExecution(e.to_string()))?;

                send(sink, AgentEvent::new(tool.event_kind(), output.clone())).await?;
                self.threads.append(thread_id, Message::tool(call.id, output));
            }
        }

        tracing::warn!(thread = thread_id, "run hit the step limit, stopping");
        Ok(())
    }
}

async fn send(sink: &mpsc::Sender<AgentEvent>, event: AgentEvent) -> Result<()> {
    sink.send(event)
        .await
        .map_err(|_| RedeemError::AgentExecution("event stream closed".to_string()))
}

//! The task service: the observe -> decide -> act -> update loop.
//!
//! [`TaskService::run_task`] drives one task to a terminal outcome.  Each
//! iteration sends the system prompt plus the agent's history to the LLM;
//! when the model requests tool calls they are dispatched (sequentially or
//! in parallel), their results are appended as tool-role messages, and the
//! loop continues.  The loop ends when the model answers without tool
//! calls, a fatal condition occurs, or the iteration bound trips.
//!
//! `run_task` never returns an error: every outcome, including
//! cancellation, is folded into the returned [`TaskResult`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use axle_core::{Agent, AgentEvent, EventPublisher, Message, Task, TaskId, ToolCall};

use crate::config::TaskServiceConfig;
use crate::error::AgentError;
use crate::executor::ToolExecutor;
use crate::llm::{LlmClient, TokenUsage};

// ---------------------------------------------------------------------------
// Result type
// ---------------------------------------------------------------------------

/// The outcome of one [`TaskService::run_task`] invocation.
#[derive(Debug, Clone)]
pub struct TaskResult {
    /// The task that was driven.
    pub task_id: TaskId,

    /// Whether the task completed with a final answer.
    pub success: bool,

    /// The final answer; empty on failure.
    pub output: String,

    /// The failure reason; empty on success.
    pub error: String,

    /// Wall-clock time from start to terminal state.
    pub duration: Duration,

    /// Loop iterations spent.
    pub iteration_count: u32,

    /// Tool calls dispatched across all iterations.
    pub tool_call_count: u32,

    /// Token usage accumulated across all LLM calls.
    pub token_usage: TokenUsage,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Drives tasks through the agent loop.
pub struct TaskService {
    llm: Arc<dyn LlmClient>,
    executor: Arc<dyn ToolExecutor>,
    publisher: Arc<dyn EventPublisher>,
    config: TaskServiceConfig,
}

/// Mutable per-run bookkeeping threaded through the loop helpers.
struct RunState {
    start: Instant,
    usage: TokenUsage,
    tool_call_count: u32,
}

impl TaskService {
    /// Create a service from its collaborators and configuration.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        executor: Arc<dyn ToolExecutor>,
        publisher: Arc<dyn EventPublisher>,
        config: TaskServiceConfig,
    ) -> Self {
        Self {
            llm,
            executor,
            publisher,
            config,
        }
    }

    /// Drive `task` on `agent` to a terminal outcome.
    ///
    /// The agent must not be driven by another `run_task` concurrently; the
    /// caller owns it for the duration of the call.
    pub async fn run_task(
        &self,
        token: &CancellationToken,
        agent: &mut Agent,
        task: &mut Task,
    ) -> TaskResult {
        let mut state = RunState {
            start: Instant::now(),
            usage: TokenUsage::default(),
            tool_call_count: 0,
        };

        task.start();
        agent.reset_iterations();
        if agent.max_iterations == 0 {
            agent.max_iterations = self.config.max_iterations;
        }

        info!(
            task_id = %task.id,
            agent_id = %agent.id,
            max_iterations = agent.max_iterations,
            "task started"
        );

        if let Some(hook) = self.config.hooks.before_task.clone() {
            if let Err(e) = hook.call(token, agent, task).await {
                return self.fail_task(token, agent, task, e.to_string(), state).await;
            }
        }

        self.publisher.publish(AgentEvent::TaskStarted {
            task_id: task.id,
            name: task.name.clone(),
            timestamp: Utc::now(),
        });

        agent.push_message(Message::user(task.input.clone()));

        while agent.can_continue() {
            if token.is_cancelled() {
                return self
                    .fail_task(token, agent, task, AgentError::ContextCanceled.to_string(), state)
                    .await;
            }

            agent.begin_iteration();
            task.iterations += 1;
            debug!(task_id = %task.id, iteration = agent.iteration, "loop iteration");

            if let Some(hook) = self.config.hooks.before_llm_call.clone() {
                if let Err(e) = hook.call(token, agent, task).await {
                    return self.fail_task(token, agent, task, e.to_string(), state).await;
                }
            }

            // The system prompt is re-prepended on every call; it never
            // lives in history, so trimming cannot lose it.
            let messages = agent.build_message_list();
            let definitions = self.executor.definitions();

            let response = match self.llm.run(token, &messages, &definitions).await {
                Ok(response) => response,
                Err(e) => {
                    return self.fail_task(token, agent, task, e.to_string(), state).await;
                }
            };

            if let Some(hook) = self.config.hooks.after_llm_call.clone() {
                if let Err(e) = hook.call(token, agent, task).await {
                    return self.fail_task(token, agent, task, e.to_string(), state).await;
                }
            }

            state.usage.add(&response.usage);
            agent.push_message(response.message.clone());

            if response.has_tool_calls() {
                state.tool_call_count += response.tool_calls.len() as u32;
                self.dispatch_tool_calls(token, agent, response.tool_calls)
                    .await;
                continue;
            }

            // No tool calls: the model's content is the final answer.
            let output = response.message.content.clone();
            task.complete(output.clone());
            self.run_after_task(token, agent, task).await;
            self.publisher.publish(AgentEvent::TaskCompleted {
                task_id: task.id,
                output: output.clone(),
                timestamp: Utc::now(),
            });

            info!(
                task_id = %task.id,
                iterations = agent.iteration,
                tool_calls = state.tool_call_count,
                "task completed"
            );

            return TaskResult {
                task_id: task.id,
                success: true,
                output,
                error: String::new(),
                duration: state.start.elapsed(),
                iteration_count: agent.iteration,
                tool_call_count: state.tool_call_count,
                token_usage: state.usage,
            };
        }

        self.fail_task(
            token,
            agent,
            task,
            AgentError::MaxIterationsReached.to_string(),
            state,
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Tool dispatch
    // -----------------------------------------------------------------------

    /// Execute all tool calls of one assistant turn and append their
    /// results to history in request order.  Individual failures surface
    /// to the model as `Error: ...` tool messages; they never fail the
    /// task.
    async fn dispatch_tool_calls(
        &self,
        token: &CancellationToken,
        agent: &mut Agent,
        calls: Vec<ToolCall>,
    ) {
        if self.config.parallel_tool_calls {
            self.dispatch_parallel(token, agent, calls).await;
        } else {
            self.dispatch_sequential(token, agent, calls).await;
        }
    }

    async fn dispatch_sequential(
        &self,
        token: &CancellationToken,
        agent: &mut Agent,
        calls: Vec<ToolCall>,
    ) {
        for mut call in calls {
            self.apply_before_tool_hook(token, agent, &mut call).await;

            if !call.is_terminal() {
                call.begin();
                match self
                    .executor
                    .execute(token, &call.name, &call.arguments)
                    .await
                {
                    Ok(result) => call.complete(result),
                    Err(e) => call.fail(e.to_string()),
                }
            }

            self.apply_after_tool_hook(token, agent, &call).await;
            self.publish_tool_event(&call);
            agent.push_message(call.to_message());
        }
    }

    async fn dispatch_parallel(
        &self,
        token: &CancellationToken,
        agent: &mut Agent,
        calls: Vec<ToolCall>,
    ) {
        // Before-hooks run on the service task, in request order; a
        // rejection marks the call failed so the worker skips execution.
        let mut prepared = Vec::with_capacity(calls.len());
        for mut call in calls {
            self.apply_before_tool_hook(token, agent, &mut call).await;
            prepared.push(call);
        }

        // Fan out.  Each worker owns its call, executes it, and publishes
        // its event; publication order across workers is unspecified.
        let mut handles = Vec::with_capacity(prepared.len());
        for call in prepared {
            let identity = (call.id.clone(), call.name.clone(), call.arguments.clone());
            let executor = Arc::clone(&self.executor);
            let publisher = Arc::clone(&self.publisher);
            let token = token.clone();

            let handle = tokio::spawn(async move {
                let mut call = call;
                if !call.is_terminal() {
                    call.begin();
                    match executor.execute(&token, &call.name, &call.arguments).await {
                        Ok(result) => call.complete(result),
                        Err(e) => call.fail(e.to_string()),
                    }
                }
                publisher.publish(AgentEvent::ToolCallExecuted {
                    call_id: call.id.clone(),
                    name: call.name.clone(),
                    result: call.result.clone(),
                    error: call.error.clone(),
                    timestamp: Utc::now(),
                });
                call
            });
            handles.push((identity, handle));
        }

        // Join in request order so history appends stay deterministic.
        for ((id, name, arguments), handle) in handles {
            let call = match handle.await {
                Ok(call) => call,
                Err(e) => {
                    warn!(tool = %name, error = %e, "tool worker panicked");
                    let mut call = ToolCall::new(id, name, arguments);
                    call.fail("tool execution task panicked");
                    call
                }
            };

            self.apply_after_tool_hook(token, agent, &call).await;
            agent.push_message(call.to_message());
        }
    }

    async fn apply_before_tool_hook(
        &self,
        token: &CancellationToken,
        agent: &Agent,
        call: &mut ToolCall,
    ) {
        if let Some(hook) = self.config.hooks.before_tool_call.clone() {
            if let Err(e) = hook.call(token, agent, call).await {
                warn!(tool = %call.name, error = %e, "tool call rejected by hook");
                call.fail(e.to_string());
            }
        }
    }

    async fn apply_after_tool_hook(
        &self,
        token: &CancellationToken,
        agent: &Agent,
        call: &ToolCall,
    ) {
        if let Some(hook) = self.config.hooks.after_tool_call.clone() {
            if let Err(e) = hook.call(token, agent, call).await {
                // After-hook failures must not disturb the terminal path.
                warn!(tool = %call.name, error = %e, "after_tool_call hook failed");
            }
        }
    }

    fn publish_tool_event(&self, call: &ToolCall) {
        self.publisher.publish(AgentEvent::ToolCallExecuted {
            call_id: call.id.clone(),
            name: call.name.clone(),
            result: call.result.clone(),
            error: call.error.clone(),
            timestamp: Utc::now(),
        });
    }

    // -----------------------------------------------------------------------
    // Failure path
    // -----------------------------------------------------------------------

    /// Terminal failure: mark the task, run the after-task hook, publish
    /// `task_failed`, and assemble the result.
    async fn fail_task(
        &self,
        token: &CancellationToken,
        agent: &Agent,
        task: &mut Task,
        error: String,
        state: RunState,
    ) -> TaskResult {
        task.fail(error.clone());
        self.run_after_task(token, agent, task).await;
        self.publisher.publish(AgentEvent::TaskFailed {
            task_id: task.id,
            error: error.clone(),
            timestamp: Utc::now(),
        });

        warn!(task_id = %task.id, error = %error, "task failed");

        TaskResult {
            task_id: task.id,
            success: false,
            output: String::new(),
            error,
            duration: state.start.elapsed(),
            iteration_count: task.iterations,
            tool_call_count: state.tool_call_count,
            token_usage: state.usage,
        }
    }

    /// Run the after-task hook, swallowing errors.
    async fn run_after_task(&self, token: &CancellationToken, agent: &Agent, task: &Task) {
        if let Some(hook) = self.config.hooks.after_task.clone() {
            if let Err(e) = hook.call(token, agent, task).await {
                warn!(task_id = %task.id, error = %e, "after_task hook failed");
            }
        }
    }
}

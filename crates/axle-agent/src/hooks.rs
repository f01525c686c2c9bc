//! The hook pipeline.
//!
//! Six optional extension points around the task lifecycle, the LLM call,
//! and each tool call.  A `before_*` hook that returns an error aborts the
//! operation it guards (the task fails, or the tool call is marked failed
//! and skipped); `after_*` hook errors are logged and swallowed so they can
//! never corrupt a terminal path.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use axle_core::{Agent, Task, ToolCall};

use crate::error::Result;

/// Hook invoked around the task lifecycle and the LLM call.
///
/// Hooks are suspension points: they receive the run's cancellation token
/// and must honor it in anything long-running they do.
#[async_trait]
pub trait TaskHook: Send + Sync {
    /// Inspect the agent and task at a lifecycle point.
    ///
    /// Returning an error from a `before_*` slot aborts the operation.
    async fn call(&self, token: &CancellationToken, agent: &Agent, task: &Task) -> Result<()>;
}

/// Hook invoked around each tool call.
#[async_trait]
pub trait ToolHook: Send + Sync {
    /// Inspect the agent and the tool call at a lifecycle point.
    ///
    /// Returning an error from the `before_tool_call` slot fails that call
    /// without executing it.
    async fn call(
        &self,
        token: &CancellationToken,
        agent: &Agent,
        tool_call: &ToolCall,
    ) -> Result<()>;
}

/// The six hook slots.  All default to absent.
#[derive(Clone, Default)]
pub struct Hooks {
    /// Runs before the task enters the loop; an error fails the task.
    pub before_task: Option<Arc<dyn TaskHook>>,

    /// Runs after the task reaches a terminal state; errors are swallowed.
    pub after_task: Option<Arc<dyn TaskHook>>,

    /// Runs before every LLM call; an error fails the task.
    pub before_llm_call: Option<Arc<dyn TaskHook>>,

    /// Runs after every LLM call; an error fails the task.
    pub after_llm_call: Option<Arc<dyn TaskHook>>,

    /// Runs before each tool call; an error fails that call (only).
    pub before_tool_call: Option<Arc<dyn ToolHook>>,

    /// Runs after each tool call; errors are swallowed.
    pub after_tool_call: Option<Arc<dyn ToolHook>>,
}

impl Hooks {
    /// Hooks with every slot empty.
    pub fn none() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set = |slot: bool| if slot { "set" } else { "-" };
        f.debug_struct("Hooks")
            .field("before_task", &set(self.before_task.is_some()))
            .field("after_task", &set(self.after_task.is_some()))
            .field("before_llm_call", &set(self.before_llm_call.is_some()))
            .field("after_llm_call", &set(self.after_llm_call.is_some()))
            .field("before_tool_call", &set(self.before_tool_call.is_some()))
            .field("after_tool_call", &set(self.after_tool_call.is_some()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::error::AgentError;

    struct CountingHook {
        calls: AtomicU32,
    }

    #[async_trait]
    impl TaskHook for CountingHook {
        async fn call(
            &self,
            _token: &CancellationToken,
            _agent: &Agent,
            _task: &Task,
        ) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct DenyingHook;

    #[async_trait]
    impl ToolHook for DenyingHook {
        async fn call(
            &self,
            _token: &CancellationToken,
            _agent: &Agent,
            tool_call: &ToolCall,
        ) -> Result<()> {
            Err(AgentError::Hook {
                hook: "before_tool_call",
                message: format!("tool {} denied", tool_call.name),
            })
        }
    }

    /// Aborts as soon as the token fires, otherwise stalls.
    struct TokenAwareHook;

    #[async_trait]
    impl TaskHook for TokenAwareHook {
        async fn call(
            &self,
            token: &CancellationToken,
            _agent: &Agent,
            _task: &Task,
        ) -> Result<()> {
            tokio::select! {
                _ = token.cancelled() => Err(AgentError::ContextCanceled),
                _ = tokio::time::sleep(std::time::Duration::from_secs(3600)) => Ok(()),
            }
        }
    }

    #[tokio::test]
    async fn task_hook_invocation() {
        let hook = CountingHook {
            calls: AtomicU32::new(0),
        };
        let token = CancellationToken::new();
        let agent = Agent::new("a", "p");
        let task = Task::new("t", "input");

        hook.call(&token, &agent, &task).await.unwrap();
        hook.call(&token, &agent, &task).await.unwrap();
        assert_eq!(hook.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn rejecting_hook_surfaces_error() {
        let token = CancellationToken::new();
        let agent = Agent::new("a", "p");
        let call = ToolCall::new("tc-1", "rm_rf", "{}");

        let err = DenyingHook.call(&token, &agent, &call).await.unwrap_err();
        assert!(err.to_string().contains("rm_rf denied"));
    }

    #[tokio::test]
    async fn hook_observes_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let agent = Agent::new("a", "p");
        let task = Task::new("t", "input");

        let err = TokenAwareHook.call(&token, &agent, &task).await.unwrap_err();
        assert_eq!(err.to_string(), "context canceled");
    }

    #[test]
    fn debug_shows_which_slots_are_set() {
        let mut hooks = Hooks::none();
        hooks.before_task = Some(Arc::new(CountingHook {
            calls: AtomicU32::new(0),
        }));
        let rendered = format!("{hooks:?}");
        assert!(rendered.contains("before_task: \"set\""));
        assert!(rendered.contains("after_task: \"-\""));
    }
}

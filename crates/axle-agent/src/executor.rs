//! Tool executor: a registry of name -> handler with per-call timeouts.
//!
//! Handlers and definitions are registered independently (a definition
//! advertises a tool to the model; a handler makes it runnable).  The
//! registry is populated at construction time and read-only while tasks
//! run.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use axle_core::resilience::{ResilienceError, Timeout};
use axle_core::{ToolDefinition, ToolHandler};

use crate::config::ToolExecutorConfig;
use crate::error::{AgentError, Result};

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// Executes model-requested tool calls against registered handlers.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Run the named tool with the raw JSON arguments.
    async fn execute(&self, token: &CancellationToken, name: &str, args: &str) -> Result<String>;

    /// Whether a handler is registered under `name`.
    fn has(&self, name: &str) -> bool;

    /// Names of every runnable tool, in registration order.
    fn tool_names(&self) -> Vec<String>;

    /// The advertised tool definitions, in registration order.
    fn definitions(&self) -> Vec<ToolDefinition>;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The standard [`ToolExecutor`]: name -> handler map plus a definition
/// catalog, with every execution bounded by the configured tool timeout.
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
    /// Registration order of handler names.
    order: Vec<String>,
    definitions: Vec<ToolDefinition>,
    timeout: Timeout,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new(config: ToolExecutorConfig) -> Self {
        Self {
            handlers: HashMap::new(),
            order: Vec::new(),
            definitions: Vec::new(),
            timeout: Timeout::new(config.tool_timeout),
        }
    }

    /// Register a handler under a name.  Re-registering a name replaces the
    /// previous handler but keeps its original position.
    pub fn register_tool(&mut self, name: impl Into<String>, handler: Arc<dyn ToolHandler>) {
        let name = name.into();
        if self.handlers.insert(name.clone(), handler).is_none() {
            self.order.push(name);
        }
    }

    /// Register a definition for the catalog handed to the model.
    pub fn register_definition(&mut self, definition: ToolDefinition) {
        self.definitions.push(definition);
    }

    /// Register a definition and its handler together under the
    /// definition's name.
    pub fn register(&mut self, definition: ToolDefinition, handler: Arc<dyn ToolHandler>) {
        self.register_tool(definition.name.clone(), handler);
        self.register_definition(definition);
    }

    /// Register `handler` under an additional name (e.g. a legacy
    /// spelling).  No catalog entry is added.
    pub fn register_alias(&mut self, alias: impl Into<String>, target: &str) {
        if let Some(handler) = self.handlers.get(target) {
            let handler = Arc::clone(handler);
            self.register_tool(alias, handler);
        }
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn execute(&self, token: &CancellationToken, name: &str, args: &str) -> Result<String> {
        if token.is_cancelled() {
            return Err(AgentError::ContextCanceled);
        }

        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound {
                tool_name: name.to_string(),
            })?;

        debug!(tool = name, "tool execution started");
        let start = Instant::now();

        match self.timeout.run(handler.call(args)).await {
            Ok(output) => {
                info!(tool = name, duration = ?start.elapsed(), "tool execution completed");
                Ok(output)
            }
            Err(ResilienceError::Timeout(limit)) => {
                warn!(tool = name, duration = ?start.elapsed(), "tool execution timed out");
                Err(AgentError::tool(name, format!("timed out after {limit:?}")))
            }
            Err(ResilienceError::Inner(e)) => {
                warn!(tool = name, duration = ?start.elapsed(), error = %e, "tool execution failed");
                Err(AgentError::Core(e))
            }
            // Timeout::run never yields these two.
            Err(ResilienceError::CircuitOpen) => Err(AgentError::CircuitOpen),
            Err(ResilienceError::Canceled) => Err(AgentError::ContextCanceled),
        }
    }

    fn has(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    fn tool_names(&self) -> Vec<String> {
        self.order.clone()
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        self.definitions.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axle_core::{CoreError, FnTool};

    fn registry(tool_timeout: Duration) -> ToolRegistry {
        ToolRegistry::new(ToolExecutorConfig { tool_timeout })
    }

    fn echo_handler() -> Arc<dyn ToolHandler> {
        Arc::new(FnTool(|args: String| async move { Ok(format!("echo: {args}")) }))
    }

    #[tokio::test]
    async fn execute_runs_registered_handler() {
        let mut registry = registry(Duration::from_secs(30));
        registry.register(ToolDefinition::new("echo", "Echo input"), echo_handler());

        let token = CancellationToken::new();
        let out = registry.execute(&token, "echo", "{}").await.unwrap();
        assert_eq!(out, "echo: {}");
    }

    #[tokio::test]
    async fn missing_tool_is_reported() {
        let registry = registry(Duration::from_secs(30));
        let token = CancellationToken::new();

        let err = registry.execute(&token, "nope", "{}").await.unwrap_err();
        assert_eq!(err.to_string(), "tool not found: nope");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_handler_times_out() {
        let mut registry = registry(Duration::from_millis(20));
        registry.register(
            ToolDefinition::new("sleepy", "Sleeps forever"),
            Arc::new(FnTool(|_args: String| async move {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok("never".to_string())
            })),
        );

        let token = CancellationToken::new();
        let err = registry.execute(&token, "sleepy", "{}").await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn handler_errors_pass_through() {
        let mut registry = registry(Duration::from_secs(30));
        registry.register(
            ToolDefinition::new("broken", "Always fails"),
            Arc::new(FnTool(|_args: String| async move {
                Err::<String, _>(CoreError::tool("broken", "no database"))
            })),
        );

        let token = CancellationToken::new();
        let err = registry.execute(&token, "broken", "{}").await.unwrap_err();
        assert!(err.to_string().contains("no database"));
    }

    #[tokio::test]
    async fn definitions_keep_registration_order() {
        let mut registry = registry(Duration::from_secs(30));
        registry.register(ToolDefinition::new("b_tool", ""), echo_handler());
        registry.register(ToolDefinition::new("a_tool", ""), echo_handler());
        registry.register(ToolDefinition::new("c_tool", ""), echo_handler());

        let names: Vec<String> = registry.definitions().iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, ["b_tool", "a_tool", "c_tool"]);
        assert_eq!(registry.tool_names(), ["b_tool", "a_tool", "c_tool"]);
    }

    #[tokio::test]
    async fn aliases_resolve_to_the_same_handler() {
        let mut registry = registry(Duration::from_secs(30));
        registry.register(ToolDefinition::new("index_scan", ""), echo_handler());
        registry.register_alias("index.scan", "index_scan");

        assert!(registry.has("index.scan"));
        let token = CancellationToken::new();
        let out = registry.execute(&token, "index.scan", "{}").await.unwrap();
        assert_eq!(out, "echo: {}");
    }

    #[tokio::test]
    async fn canceled_token_short_circuits() {
        let mut registry = registry(Duration::from_secs(30));
        registry.register(ToolDefinition::new("echo", ""), echo_handler());

        let token = CancellationToken::new();
        token.cancel();
        let err = registry.execute(&token, "echo", "{}").await.unwrap_err();
        assert_eq!(err.to_string(), "context canceled");
    }
}

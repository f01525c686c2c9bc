//! Agent engine error types.
//!
//! All engine subsystems surface errors through [`AgentError`].  The three
//! broad shapes (LLM, tool, task) carry a message plus an optional cause
//! chain for programmatic inspection; the well-known terminal conditions
//! (`max iterations reached`, `context canceled`, circuit open, tool not
//! found) are dedicated variants with stable display strings, because those
//! strings end up verbatim in task results and events.

use axle_core::{CoreError, TaskId, resilience::ResilienceError};

/// Unified error type for the agent engine.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    // -- LLM errors ----------------------------------------------------------
    /// An outbound LLM or embedding call failed.
    ///
    /// Displays as the bare message: the text is surfaced verbatim as the
    /// task's failure reason.
    #[error("{message}")]
    Llm {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The circuit breaker is open; no call was attempted.
    #[error("circuit breaker open")]
    CircuitOpen,

    // -- Tool errors ---------------------------------------------------------
    /// A tool invocation failed.
    #[error("tool `{tool_name}` failed: {message}")]
    Tool {
        tool_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A tool call referenced a name missing from the registry.
    #[error("tool not found: {tool_name}")]
    ToolNotFound { tool_name: String },

    // -- Task errors ---------------------------------------------------------
    /// A task reached a terminal failure for the given reason.
    #[error("task {task_id} failed: {reason}")]
    Task { task_id: TaskId, reason: String },

    /// The loop exhausted the agent's iteration bound.
    #[error("max iterations reached")]
    MaxIterationsReached,

    /// The cancellation context fired.
    #[error("context canceled")]
    ContextCanceled,

    /// A lifecycle hook rejected the operation.
    #[error("{message}")]
    Hook {
        /// Which hook slot rejected.
        hook: &'static str,
        message: String,
    },

    // -- Configuration -------------------------------------------------------
    /// Configuration loading or validation failed.
    #[error("config error: {reason}")]
    Config { reason: String },

    // -- Serialization / upstream --------------------------------------------
    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A core-contract error (validation, invalid arguments).
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl AgentError {
    /// Build an LLM failure without an underlying cause.
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm {
            message: message.into(),
            source: None,
        }
    }

    /// Build a tool failure without an underlying cause.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool_name: tool_name.into(),
            message: message.into(),
            source: None,
        }
    }
}

impl From<ResilienceError<AgentError>> for AgentError {
    fn from(err: ResilienceError<AgentError>) -> Self {
        match err {
            ResilienceError::Timeout(limit) => {
                Self::llm(format!("request timed out after {limit:?}"))
            }
            ResilienceError::CircuitOpen => Self::CircuitOpen,
            ResilienceError::Canceled => Self::ContextCanceled,
            ResilienceError::Inner(inner) => inner,
        }
    }
}

/// Convenience alias used throughout the agent crate.
pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_display_strings_are_stable() {
        assert_eq!(AgentError::MaxIterationsReached.to_string(), "max iterations reached");
        assert_eq!(AgentError::ContextCanceled.to_string(), "context canceled");
        assert_eq!(AgentError::CircuitOpen.to_string(), "circuit breaker open");
        assert_eq!(
            AgentError::ToolNotFound { tool_name: "missing".into() }.to_string(),
            "tool not found: missing"
        );
    }

    #[test]
    fn llm_error_displays_bare_message() {
        assert_eq!(AgentError::llm("LLM connection failed").to_string(), "LLM connection failed");
    }

    #[test]
    fn resilience_errors_map_to_sentinels() {
        let open: AgentError = ResilienceError::<AgentError>::CircuitOpen.into();
        assert!(matches!(open, AgentError::CircuitOpen));

        let canceled: AgentError = ResilienceError::<AgentError>::Canceled.into();
        assert!(matches!(canceled, AgentError::ContextCanceled));

        let inner: AgentError = ResilienceError::Inner(AgentError::llm("boom")).into();
        assert_eq!(inner.to_string(), "boom");
    }
}

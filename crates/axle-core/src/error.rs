//! Core error types.
//!
//! Everything in this crate surfaces errors through [`CoreError`].  Tool
//! handlers in downstream crates use the same type so the executor can treat
//! all tool failures uniformly.

use std::collections::BTreeMap;

/// Unified error type for the core contracts.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The raw argument payload of a tool call was not a JSON object.
    #[error("invalid tool arguments")]
    InvalidArguments {
        /// The tool whose arguments failed to parse.
        tool_name: String,
    },

    /// One or more argument fields violated the tool's parameter schema.
    ///
    /// `errors` maps each offending field name to a human-readable message.
    /// All fields are checked before the error is returned, so a single
    /// validation pass reports every problem at once.
    #[error("validation failed for tool `{tool_name}`: {}", format_field_errors(.errors))]
    Validation {
        tool_name: String,
        errors: BTreeMap<String, String>,
    },

    /// A tool handler failed while executing.
    #[error("tool `{tool_name}` failed: {message}")]
    Tool {
        tool_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An entity attempted an illegal lifecycle transition.
    #[error("invalid state transition for {entity}: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Build a tool failure without an underlying cause.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool_name: tool_name.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Build a tool failure wrapping an underlying cause.
    pub fn tool_with_source(
        tool_name: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Tool {
            tool_name: tool_name.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Render a field-error map as `field: message; field: message`.
fn format_field_errors(errors: &BTreeMap<String, String>) -> String {
    errors
        .iter()
        .map(|(field, msg)| format!("{field}: {msg}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;

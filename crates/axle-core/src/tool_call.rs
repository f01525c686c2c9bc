//! Tool-call lifecycle.
//!
//! A [`ToolCall`] is a model-requested function invocation.  It moves
//! through `pending -> executing -> completed | failed`; terminal states are
//! frozen, and a terminal call always has a result or an error but never
//! both.

use serde::{Deserialize, Serialize};

use crate::id::ToolCallId;
use crate::message::Message;

/// Execution state of a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallStatus {
    Pending,
    Executing,
    Completed,
    Failed,
}

impl ToolCallStatus {
    /// Whether the status is `completed` or `failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// A model-requested function invocation with raw JSON arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation id assigned by the model.
    pub id: ToolCallId,

    /// Name of the tool to invoke.
    pub name: String,

    /// Arguments as the raw JSON string the model produced.
    pub arguments: String,

    /// Current lifecycle state.
    pub status: ToolCallStatus,

    /// Result payload, set when the call completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// Error message, set when the call failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolCall {
    /// Create a pending tool call.
    pub fn new(
        id: impl Into<ToolCallId>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
            status: ToolCallStatus::Pending,
            result: None,
            error: None,
        }
    }

    /// Transition `pending -> executing`.  No-op once terminal.
    pub fn begin(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.status = ToolCallStatus::Executing;
    }

    /// Mark the call completed with a result.  No-op once terminal.
    pub fn complete(&mut self, result: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = ToolCallStatus::Completed;
        self.result = Some(result.into());
        self.error = None;
    }

    /// Mark the call failed with an error.  No-op once terminal.
    pub fn fail(&mut self, error: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = ToolCallStatus::Failed;
        self.error = Some(error.into());
        self.result = None;
    }

    /// Whether the call has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Convert the terminated call into the tool-role message fed back to
    /// the model.  Failed calls render as `Error: <error>`.
    pub fn to_message(&self) -> Message {
        let content = match (&self.result, &self.error) {
            (Some(result), _) => result.clone(),
            (None, Some(error)) => format!("Error: {error}"),
            (None, None) => String::new(),
        };
        Message::tool_result(self.id.clone(), content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_happy_path() {
        let mut call = ToolCall::new("tc-1", "search", r#"{"query":"test"}"#);
        assert_eq!(call.status, ToolCallStatus::Pending);

        call.begin();
        assert_eq!(call.status, ToolCallStatus::Executing);

        call.complete("search result");
        assert_eq!(call.status, ToolCallStatus::Completed);
        assert_eq!(call.result.as_deref(), Some("search result"));
        assert!(call.error.is_none());
    }

    #[test]
    fn terminal_state_is_frozen() {
        let mut call = ToolCall::new("tc-1", "search", "{}");
        call.begin();
        call.fail("boom");
        assert_eq!(call.status, ToolCallStatus::Failed);

        // Later transitions must not revive a terminal call.
        call.complete("too late");
        assert_eq!(call.status, ToolCallStatus::Failed);
        assert!(call.result.is_none());
        assert_eq!(call.error.as_deref(), Some("boom"));
    }

    #[test]
    fn result_xor_error_in_terminal_state() {
        let mut ok = ToolCall::new("a", "t", "{}");
        ok.complete("fine");
        assert!(ok.result.is_some() && ok.error.is_none());

        let mut bad = ToolCall::new("b", "t", "{}");
        bad.fail("nope");
        assert!(bad.result.is_none() && bad.error.is_some());
    }

    #[test]
    fn to_message_renders_result() {
        let mut call = ToolCall::new("tc-7", "search", "{}");
        call.complete("found it");
        let msg = call.to_message();
        assert_eq!(msg.content, "found it");
        assert_eq!(msg.tool_call_id.as_ref().unwrap().as_str(), "tc-7");
    }

    #[test]
    fn to_message_renders_error() {
        let mut call = ToolCall::new("tc-8", "search", "{}");
        call.fail("connection refused");
        let msg = call.to_message();
        assert_eq!(msg.content, "Error: connection refused");
    }
}

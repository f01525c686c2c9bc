//! LLM and embedding client seams.
//!
//! The task service speaks [`LlmClient`]; memory enrichment speaks
//! [`EmbeddingClient`].  The [`openai`] module implements both against any
//! OpenAI-compatible HTTP endpoint; [`wire`] holds the wire-format structs
//! it translates to and from.

pub mod openai;
pub(crate) mod wire;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use axle_core::{Message, ToolCall, ToolDefinition};

use crate::error::Result;

pub use openai::{OpenAiChatClient, OpenAiEmbeddingClient};

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Token accounting for one or more LLM calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Accumulate another call's usage into this one.
    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// One assistant turn as the engine consumes it.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// The assistant message to append to history (carries any tool calls).
    pub message: Message,

    /// The provider's finish reason (`"stop"`, `"tool_calls"`, ...).
    pub finish_reason: String,

    /// The tool calls requested this turn, in request order.
    pub tool_calls: Vec<ToolCall>,

    /// Token usage for this call.
    pub usage: TokenUsage,
}

impl LlmResponse {
    /// Whether the model requested any tool calls.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Client contracts
// ---------------------------------------------------------------------------

/// A chat-completion backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one model turn over the given messages and tool catalog.
    async fn run(
        &self,
        token: &CancellationToken,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse>;
}

/// An embeddings backend.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embed a single input text.
    async fn embed(&self, token: &CancellationToken, input: &str) -> Result<Vec<f32>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_accumulates() {
        let mut total = TokenUsage::default();
        total.add(&TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        });
        total.add(&TokenUsage {
            prompt_tokens: 1,
            completion_tokens: 2,
            total_tokens: 3,
        });
        assert_eq!(total.prompt_tokens, 11);
        assert_eq!(total.completion_tokens, 7);
        assert_eq!(total.total_tokens, 18);
    }

    #[test]
    fn has_tool_calls_tracks_vector() {
        let response = LlmResponse {
            message: Message::assistant("done"),
            finish_reason: "stop".into(),
            tool_calls: Vec::new(),
            usage: TokenUsage::default(),
        };
        assert!(!response.has_tool_calls());

        let response = LlmResponse {
            message: Message::assistant_tool_calls(
                "",
                vec![ToolCall::new("tc-1", "search", "{}")],
            ),
            finish_reason: "tool_calls".into(),
            tool_calls: vec![ToolCall::new("tc-1", "search", "{}")],
            usage: TokenUsage::default(),
        };
        assert!(response.has_tool_calls());
    }
}

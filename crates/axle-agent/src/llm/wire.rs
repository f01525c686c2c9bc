//! OpenAI chat-completions and embeddings wire format.
//!
//! Typed request/response bodies plus the translation between the wire
//! shapes and the engine's domain types.  Kept separate from the client so
//! the HTTP plumbing never touches raw JSON trees.

use serde::{Deserialize, Serialize};

use axle_core::{Message, Role, ToolCall, ToolDefinition};

use crate::llm::TokenUsage;

// ---------------------------------------------------------------------------
// Chat request
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<WireTool>>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub(crate) struct WireMessage {
    #[serde(default)]
    pub role: String,
    /// Responses may carry `content: null` for pure tool-call turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireFunctionCall {
    pub name: String,
    /// Raw JSON string, exactly as the model produced it.
    pub arguments: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireTool {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: WireFunctionDef,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireFunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Chat response
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    #[serde(default)]
    pub finish_reason: Option<String>,
    pub message: WireMessage,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct WireUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl From<WireUsage> for TokenUsage {
    fn from(usage: WireUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

// ---------------------------------------------------------------------------
// Embeddings
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct EmbeddingRequest {
    pub model: String,
    pub input: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingResponse {
    #[serde(default)]
    pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingData {
    pub embedding: Vec<f32>,
}

// ---------------------------------------------------------------------------
// Domain <-> wire translation
// ---------------------------------------------------------------------------

/// Convert a domain message into its wire shape.
pub(crate) fn to_wire_message(message: &Message) -> WireMessage {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    let tool_calls = if message.tool_calls.is_empty() {
        None
    } else {
        Some(
            message
                .tool_calls
                .iter()
                .map(|call| WireToolCall {
                    id: call.id.to_string(),
                    kind: "function".to_string(),
                    function: WireFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                    },
                })
                .collect(),
        )
    };

    WireMessage {
        role: role.to_string(),
        content: Some(message.content.clone()),
        tool_call_id: message.tool_call_id.as_ref().map(|id| id.to_string()),
        tool_calls,
    }
}

/// Build the `tools` payload from the executor's catalog.
pub(crate) fn to_wire_tools(tools: &[ToolDefinition]) -> Option<Vec<WireTool>> {
    if tools.is_empty() {
        return None;
    }
    Some(
        tools
            .iter()
            .map(|def| WireTool {
                kind: "function",
                function: WireFunctionDef {
                    name: def.name.clone(),
                    description: def.description.clone(),
                    parameters: def.parameters_schema(),
                },
            })
            .collect(),
    )
}

/// Convert a response message's tool calls into pending domain calls.
pub(crate) fn to_domain_tool_calls(wire: &WireMessage) -> Vec<ToolCall> {
    wire.tool_calls
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|call| {
            ToolCall::new(
                call.id.as_str(),
                call.function.name.clone(),
                call.function.arguments.clone(),
            )
        })
        .collect()
}

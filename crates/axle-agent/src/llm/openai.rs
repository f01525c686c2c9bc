//! OpenAI-compatible HTTP clients.
//!
//! Works against any endpoint speaking the OpenAI chat-completions and
//! embeddings protocols (OpenAI itself, local inference servers, gateways).
//! Every outbound call is composed, innermost to outermost, as
//! Timeout -> Retry -> CircuitBreaker.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use axle_core::resilience::{CircuitBreaker, Retry, Timeout};
use axle_core::{Message, ToolCall, ToolDefinition};

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{AgentError, Result};
use crate::llm::wire::{
    ChatCompletionRequest, ChatCompletionResponse, EmbeddingRequest, EmbeddingResponse,
    to_domain_tool_calls, to_wire_message, to_wire_tools,
};
use crate::llm::{EmbeddingClient, LlmClient, LlmResponse, TokenUsage};

// ---------------------------------------------------------------------------
// Chat client
// ---------------------------------------------------------------------------

/// Chat-completions client over an OpenAI-compatible endpoint.
pub struct OpenAiChatClient {
    config: Arc<LlmConfig>,
    http: reqwest::Client,
    timeout: Timeout,
    retry: Retry,
    breaker: CircuitBreaker,
}

impl OpenAiChatClient {
    /// Create a client from its configuration.
    pub fn new(config: LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AgentError::llm(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            timeout: Timeout::new(config.llm_timeout),
            retry: Retry::new(config.retry_attempts, config.retry_delay),
            breaker: CircuitBreaker::new(config.breaker_threshold),
            config: Arc::new(config),
            http,
        })
    }

    /// Single request attempt: POST, check status, decode.
    async fn send_chat(&self, body: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);
        debug!(url = %url, model = %body.model, "sending chat completion request");

        let mut request = self.http.post(&url).json(body);
        if !self.config.api_key.is_empty() {
            request = request.header(AUTHORIZATION, format!("Bearer {}", self.config.api_key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AgentError::llm(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AgentError::llm(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(AgentError::llm(format!("API returned {status}: {text}")));
        }

        serde_json::from_str(&text)
            .map_err(|e| AgentError::llm(format!("invalid chat completion response: {e}")))
    }

    /// Turn the first choice of a decoded response into an [`LlmResponse`].
    fn to_response(&self, decoded: ChatCompletionResponse) -> Result<LlmResponse> {
        let choice = decoded
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::llm("response contained no choices"))?;

        let content = choice.message.content.clone().unwrap_or_default();
        let tool_calls: Vec<ToolCall> = to_domain_tool_calls(&choice.message);

        let message = if tool_calls.is_empty() {
            Message::assistant(content)
        } else {
            Message::assistant_tool_calls(content, tool_calls.clone())
        };

        Ok(LlmResponse {
            message,
            finish_reason: choice.finish_reason.unwrap_or_default(),
            tool_calls,
            usage: decoded.usage.map(TokenUsage::from).unwrap_or_default(),
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    async fn run(
        &self,
        token: &CancellationToken,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: messages.iter().map(to_wire_message).collect(),
            tools: to_wire_tools(tools),
        };

        let decoded = self
            .breaker
            .run(|| {
                self.retry
                    .run(token, || self.timeout.run(self.send_chat(&body)))
            })
            .await
            .map_err(AgentError::from)?;

        debug!(id = %decoded.id, model = %decoded.model, "chat completion received");
        self.to_response(decoded)
    }
}

// ---------------------------------------------------------------------------
// Embedding client
// ---------------------------------------------------------------------------

/// Embeddings client over an OpenAI-compatible endpoint.
pub struct OpenAiEmbeddingClient {
    config: Arc<EmbeddingConfig>,
    http: reqwest::Client,
    timeout: Timeout,
    retry: Retry,
    breaker: CircuitBreaker,
}

impl OpenAiEmbeddingClient {
    /// Create a client from its configuration.
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.embed_timeout)
            .build()
            .map_err(|e| AgentError::llm(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            timeout: Timeout::new(config.embed_timeout),
            retry: Retry::new(config.retry_attempts, config.retry_delay),
            breaker: CircuitBreaker::new(config.breaker_threshold),
            config: Arc::new(config),
            http,
        })
    }

    async fn send_embedding(&self, body: &EmbeddingRequest) -> Result<EmbeddingResponse> {
        let url = format!("{}/v1/embeddings", self.config.base_url);
        debug!(url = %url, model = %body.model, "sending embedding request");

        let mut request = self.http.post(&url).json(body);
        if !self.config.api_key.is_empty() {
            request = request.header(AUTHORIZATION, format!("Bearer {}", self.config.api_key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AgentError::llm(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AgentError::llm(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(AgentError::llm(format!("API returned {status}: {text}")));
        }

        serde_json::from_str(&text)
            .map_err(|e| AgentError::llm(format!("invalid embedding response: {e}")))
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddingClient {
    async fn embed(&self, token: &CancellationToken, input: &str) -> Result<Vec<f32>> {
        let body = EmbeddingRequest {
            model: self.config.model.clone(),
            input: input.to_string(),
        };

        let decoded = self
            .breaker
            .run(|| {
                self.retry
                    .run(token, || self.timeout.run(self.send_embedding(&body)))
            })
            .await
            .map_err(AgentError::from)?;

        decoded
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AgentError::llm("embedding response contained no data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiChatClient {
        OpenAiChatClient::new(LlmConfig {
            model: "test-model".into(),
            ..LlmConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn first_choice_is_used() {
        let decoded: ChatCompletionResponse = serde_json::from_str(
            r#"{
                "choices": [
                    {"index": 0, "finish_reason": "stop", "message": {"role": "assistant", "content": "first"}},
                    {"index": 1, "finish_reason": "stop", "message": {"role": "assistant", "content": "second"}}
                ]
            }"#,
        )
        .unwrap();

        let response = client().to_response(decoded).unwrap();
        assert_eq!(response.message.content, "first");
        assert_eq!(response.finish_reason, "stop");
        assert!(!response.has_tool_calls());
    }

    #[test]
    fn empty_choices_is_an_error() {
        let decoded: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        let err = client().to_response(decoded).unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn tool_call_turn_builds_assistant_message() {
        let decoded: ChatCompletionResponse = serde_json::from_str(
            r#"{
                "choices": [{
                    "index": 0,
                    "finish_reason": "tool_calls",
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "tc-1",
                            "type": "function",
                            "function": {"name": "search", "arguments": "{}"}
                        }]
                    }
                }]
            }"#,
        )
        .unwrap();

        let response = client().to_response(decoded).unwrap();
        assert!(response.has_tool_calls());
        assert_eq!(response.message.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "search");
    }
}

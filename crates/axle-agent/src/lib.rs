//! Agent engine for axle.
//!
//! This crate drives the observe -> decide -> act -> update loop: it sends
//! the conversation to an LLM, executes the tool calls the model requests,
//! feeds the results back, and repeats until the model produces a final
//! answer or a safety bound trips.
//!
//! ## Modules
//!
//! - [`service`] -- the task loop and its [`TaskResult`].
//! - [`executor`] -- the tool registry with per-call timeouts.
//! - [`hooks`] -- the six lifecycle extension points.
//! - [`llm`] -- LLM and embedding client seams plus the OpenAI-compatible
//!   implementations.
//! - [`config`] -- plain-struct configuration, TOML loadable.
//! - [`error`] -- agent error types.

pub mod config;
pub mod error;
pub mod executor;
pub mod hooks;
pub mod llm;
pub mod service;

// Re-export the most commonly used types at the crate root.
pub use config::{
    AxleConfig, EmbeddingConfig, LlmConfig, StoreBackend, StoreConfig, TaskServiceConfig,
    ToolExecutorConfig,
};
pub use error::{AgentError, Result};
pub use executor::{ToolExecutor, ToolRegistry};
pub use hooks::{Hooks, TaskHook, ToolHook};
pub use llm::{
    EmbeddingClient, LlmClient, LlmResponse, OpenAiChatClient, OpenAiEmbeddingClient, TokenUsage,
};
pub use service::{TaskResult, TaskService};

//! Core contracts for the axle agent engine.
//!
//! This crate holds everything the rest of the workspace agrees on:
//!
//! - **[`id`]** -- typed identifiers for agents, tasks, tool calls, notes,
//!   and snapshots.
//! - **[`message`]**, **[`tool_call`]**, **[`task`]**, **[`agent`]** -- the
//!   conversation entities and their lifecycles.
//! - **[`tool`]** -- declarative tool schemas, JSON argument validation,
//!   and the [`ToolHandler`] contract.
//! - **[`events`]** -- lifecycle event contracts, the publisher trait, and
//!   a broadcast bus.
//! - **[`resilience`]** -- Timeout / Retry / CircuitBreaker combinators for
//!   outbound calls.
//! - **[`error`]** -- unified core error types via `thiserror`.
//!
//! All public types are `Send + Sync` and designed for use within a
//! multi-threaded tokio runtime.

pub mod agent;
pub mod error;
pub mod events;
pub mod id;
pub mod message;
pub mod resilience;
pub mod task;
pub mod tool;
pub mod tool_call;

// Re-export the most commonly used types at the crate root for convenience.
pub use agent::{Agent, DEFAULT_MAX_ITERATIONS};
pub use error::{CoreError, Result};
pub use events::{AgentEvent, EventBus, EventPublisher, NoopPublisher, topics};
pub use id::{AgentId, NoteId, SnapshotId, TaskId, ToolCallId};
pub use message::{Message, Role};
pub use resilience::{CircuitBreaker, ResilienceError, Retry, Timeout};
pub use task::{Task, TaskStatus};
pub use tool::{
    FnTool, ParameterDefinition, ParameterType, ToolDefinition, ToolHandler, validate_arguments,
};
pub use tool_call::{ToolCall, ToolCallStatus};

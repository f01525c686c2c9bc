//! Event contracts and the broadcast bus.
//!
//! The task service announces lifecycle milestones as [`AgentEvent`]s
//! through an [`EventPublisher`].  Publication is fire-and-forget: a sink
//! that drops events never disturbs the task outcome.
//!
//! [`EventBus`] is the in-process implementation, a publish/subscribe
//! channel built on [`tokio::sync::broadcast`] with [`Arc`]-wrapped payloads
//! so fan-out does not clone event bodies.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::id::{TaskId, ToolCallId};

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

/// Well-known topic strings, one per event variant.
pub mod topics {
    pub const TASK_STARTED: &str = "agent.task_started";
    pub const TASK_COMPLETED: &str = "agent.task_completed";
    pub const TASK_FAILED: &str = "agent.task_failed";
    pub const TOOL_CALL_EXECUTED: &str = "agent.tool_call_executed";
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A lifecycle event published by the task service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentEvent {
    /// A task transitioned to `running`.
    TaskStarted {
        task_id: TaskId,
        /// Human-readable task name.
        name: String,
        timestamp: DateTime<Utc>,
    },

    /// A task completed with a final answer.
    TaskCompleted {
        task_id: TaskId,
        /// The model's final output.
        output: String,
        timestamp: DateTime<Utc>,
    },

    /// A task failed.
    TaskFailed {
        task_id: TaskId,
        /// The failure reason as surfaced in the task result.
        error: String,
        timestamp: DateTime<Utc>,
    },

    /// A single tool call terminated (successfully or not).
    ToolCallExecuted {
        call_id: ToolCallId,
        /// The tool that was invoked.
        name: String,
        /// Result payload when the call succeeded.
        result: Option<String>,
        /// Error message when the call failed.
        error: Option<String>,
        timestamp: DateTime<Utc>,
    },
}

impl AgentEvent {
    /// The topic string for this event.
    pub fn topic(&self) -> &'static str {
        match self {
            Self::TaskStarted { .. } => topics::TASK_STARTED,
            Self::TaskCompleted { .. } => topics::TASK_COMPLETED,
            Self::TaskFailed { .. } => topics::TASK_FAILED,
            Self::ToolCallExecuted { .. } => topics::TOOL_CALL_EXECUTED,
        }
    }
}

// ---------------------------------------------------------------------------
// Publisher contract
// ---------------------------------------------------------------------------

/// Any sink accepting lifecycle events.
///
/// Implementations must not block on slow consumers and must swallow
/// delivery failures; the task service treats publication as infallible.
pub trait EventPublisher: Send + Sync {
    /// Publish one event.
    fn publish(&self, event: AgentEvent);
}

/// Publisher that discards every event.  Useful for embedding the service
/// without an event sink, and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

impl EventPublisher for NoopPublisher {
    fn publish(&self, _event: AgentEvent) {}
}

// ---------------------------------------------------------------------------
// Broadcast bus
// ---------------------------------------------------------------------------

/// Publish/subscribe event bus backed by [`tokio::sync::broadcast`].
///
/// Cheaply cloneable; subscribers receive [`Arc<AgentEvent>`] references.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Arc<AgentEvent>>,
}

impl EventBus {
    /// Create a bus with the given channel capacity.
    ///
    /// A subscriber that falls behind by more than `capacity` events
    /// observes a `Lagged` error and resumes from the oldest retained
    /// event.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new subscriber receiving all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<AgentEvent>> {
        self.sender.subscribe()
    }

    /// Current number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventPublisher for EventBus {
    fn publish(&self, event: AgentEvent) {
        let topic = event.topic();
        match self.sender.send(Arc::new(event)) {
            Ok(n) => {
                tracing::trace!(topic, receivers = n, "event published");
            }
            Err(_) => {
                // No active receivers; common during startup and shutdown.
                tracing::trace!(topic, "event published with no receivers");
            }
        }
    }
}

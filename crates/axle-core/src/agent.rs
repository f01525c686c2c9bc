//! The agent aggregate.
//!
//! An [`Agent`] holds everything a task run mutates: the system prompt, the
//! bounded conversation history, the ordered task queue, and the iteration
//! counter the loop checks against its safety bound.  The aggregate carries
//! no locking; a single task run owns its agent exclusively.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::id::AgentId;
use crate::message::Message;
use crate::task::{Task, TaskStatus};

/// Default iteration safety bound for newly created agents.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// An agent: identity, prompt, history, and task queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Unique identifier.
    pub id: AgentId,

    /// Human-readable agent name.
    pub name: String,

    /// System prompt re-prepended to every LLM call.  Never stored in
    /// `messages`, so history trimming cannot lose it.
    pub system_prompt: String,

    /// Ordered conversation history (user, assistant, and tool messages).
    pub messages: Vec<Message>,

    /// Ordered task queue.
    pub tasks: Vec<Task>,

    /// Iteration counter for the task currently being driven.
    pub iteration: u32,

    /// Safety bound on loop iterations.  `0` means "unset": the task
    /// service stamps its configured default at task start.
    pub max_iterations: u32,

    /// History cap.  `0` disables trimming; otherwise the oldest messages
    /// are dropped (FIFO) whenever an append pushes the history over the
    /// cap.  The system prompt is not part of the history and is never
    /// counted.
    pub max_messages: usize,

    /// Free-form string metadata.
    pub metadata: HashMap<String, String>,
}

impl Agent {
    /// Create an agent with the default iteration bound and no history cap.
    pub fn new(name: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            id: AgentId::new(),
            name: name.into(),
            system_prompt: system_prompt.into(),
            messages: Vec::new(),
            tasks: Vec::new(),
            iteration: 0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_messages: 0,
            metadata: HashMap::new(),
        }
    }

    /// Append a message to the history, applying the FIFO trim when a cap
    /// is configured.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        if self.max_messages > 0 {
            while self.messages.len() > self.max_messages {
                let dropped = self.messages.remove(0);
                tracing::debug!(
                    agent_id = %self.id,
                    role = %dropped.role,
                    "history cap reached, oldest message dropped"
                );
            }
        }
    }

    /// Build the message list for one LLM call: the system prompt followed
    /// by the full history.
    pub fn build_message_list(&self) -> Vec<Message> {
        let mut list = Vec::with_capacity(self.messages.len() + 1);
        list.push(Message::system(self.system_prompt.clone()));
        list.extend(self.messages.iter().cloned());
        list
    }

    /// Whether the loop may run another iteration.
    pub fn can_continue(&self) -> bool {
        self.iteration < self.max_iterations
    }

    /// Advance the iteration counter by one.
    pub fn begin_iteration(&mut self) {
        self.iteration += 1;
    }

    /// Reset the iteration counter for a fresh task.
    pub fn reset_iterations(&mut self) {
        self.iteration = 0;
    }

    /// Append a task to the queue.
    pub fn enqueue_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Index of the oldest task still pending, if any.
    pub fn next_pending(&self) -> Option<usize> {
        self.tasks
            .iter()
            .position(|t| t.status == TaskStatus::Pending)
    }
}

//! Task lifecycle.
//!
//! A [`Task`] is one unit of user-supplied work driven to completion by the
//! task service.  Lifecycle: `pending -> running -> completed | failed`.
//! Only the task service advances the lifecycle; terminal states are frozen.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::TaskId;

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Whether the status is `completed` or `failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A single unit of work for an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier.
    pub id: TaskId,

    /// Human-readable task name.
    pub name: String,

    /// The natural-language input that seeds the conversation.
    pub input: String,

    /// Current lifecycle state.
    pub status: TaskStatus,

    /// When the task was created (queued).
    pub created_at: DateTime<Utc>,

    /// When the task service started driving the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the task reached a terminal state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Final answer, set on completion.
    #[serde(default)]
    pub output: String,

    /// Failure reason, set on failure.
    #[serde(default)]
    pub error: String,

    /// Number of loop iterations spent on this task.
    #[serde(default)]
    pub iterations: u32,
}

impl Task {
    /// Create a pending task.
    pub fn new(name: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            name: name.into(),
            input: input.into(),
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            output: String::new(),
            error: String::new(),
            iterations: 0,
        }
    }

    /// Transition `pending -> running` and stamp `started_at`.
    /// No-op once terminal.
    pub fn start(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.status = TaskStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Mark the task completed with its final output.  No-op once terminal.
    pub fn complete(&mut self, output: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = TaskStatus::Completed;
        self.output = output.into();
        self.completed_at = Some(Utc::now());
    }

    /// Mark the task failed with an error message.  No-op once terminal.
    pub fn fail(&mut self, error: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = TaskStatus::Failed;
        self.error = error.into();
        self.completed_at = Some(Utc::now());
    }

    /// Whether the task has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Wall-clock time between start and termination.
    ///
    /// Zero while the task has not both started and terminated.
    pub fn duration(&self) -> Duration {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => (end - start).to_std().unwrap_or_default(),
            _ => Duration::ZERO,
        }
    }

    /// Time the task spent queued before the service picked it up.
    pub fn wait_time(&self) -> Duration {
        match self.started_at {
            Some(start) => (start - self.created_at).to_std().unwrap_or_default(),
            None => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_to_completed() {
        let mut task = Task::new("answer", "What is 2+2?");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.duration(), Duration::ZERO);

        task.start();
        assert_eq!(task.status, TaskStatus::Running);
        assert!(task.started_at.is_some());

        task.complete("4");
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.output, "4");
        assert!(task.completed_at.is_some());
    }

    #[test]
    fn terminal_state_is_frozen() {
        let mut task = Task::new("t", "input");
        task.start();
        task.fail("llm unreachable");
        assert_eq!(task.status, TaskStatus::Failed);

        task.complete("should not apply");
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.output.is_empty());
        assert_eq!(task.error, "llm unreachable");
    }

    #[test]
    fn duration_zero_until_started() {
        let mut task = Task::new("t", "input");
        // Failing a never-started task leaves duration at zero.
        task.fail("hook rejected");
        assert_eq!(task.duration(), Duration::ZERO);
    }
}

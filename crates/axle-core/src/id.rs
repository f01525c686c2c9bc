//! Typed identifiers.
//!
//! Every aggregate in the engine correlates by id across crates (events,
//! stores, tool results), so ids are newtypes rather than bare strings:
//! mixing up a task id and a tool-call id becomes a compile error.
//!
//! Engine-generated ids ([`AgentId`], [`TaskId`]) are UUID v7 so they sort
//! by creation time.  Externally assigned ids ([`ToolCallId`], [`NoteId`],
//! [`SnapshotId`]) are opaque strings: tool-call ids come from the model,
//! note and snapshot ids from whichever id source the caller wires in.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// UUID-backed ids
// ---------------------------------------------------------------------------

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh time-ordered id.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id! {
    /// Identity of an [`crate::Agent`] aggregate.
    AgentId
}

uuid_id! {
    /// Identity of a [`crate::Task`].
    TaskId
}

// ---------------------------------------------------------------------------
// String-backed ids
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw id string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the id as a `&str`.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

string_id! {
    /// Correlation id the model assigns to a tool call.
    ToolCallId
}

string_id! {
    /// Identity of a stored memory note.
    NoteId
}

string_id! {
    /// Identity of a file-index snapshot.
    SnapshotId
}

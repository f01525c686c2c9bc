//! Storage layer for the axle agent engine.
//!
//! Everything here is written against the generic [`Access`] key/value
//! contract, so every store runs unchanged over the in-memory, JSON-file,
//! and YAML-file backends:
//!
//! - **[`access`]** -- the `Access<K, V>` contract and its backends.
//! - **[`conversation`]** -- agent history persistence, including the
//!   AES-256-GCM encrypted wrapper.
//! - **[`memory`]** -- memory notes with scoped text and vector search.
//! - **[`crypto`]** -- the sealing primitives the encrypted store uses.
//! - **[`error`]** -- unified store error types via `thiserror`.

pub mod access;
pub mod conversation;
pub mod crypto;
pub mod error;
pub mod memory;

// Re-export the most commonly used types at the crate root.
pub use access::{Access, FileBackend, FileFormat, MemoryBackend};
pub use conversation::{ConversationStore, EncryptedConversationStore, KvConversationStore};
pub use error::{StoreError, StoreResult};
pub use memory::{MemoryNote, MemoryStore, SearchOptions, SourceType, cosine_similarity};

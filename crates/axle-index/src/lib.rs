//! File indexing for the axle agent engine.
//!
//! The indexer takes point-in-time snapshots of a file tree and answers
//! "what changed" questions over them:
//!
//! - **[`walker`]** -- the [`FileWalker`] seam and the real
//!   `walkdir`-backed implementation with glob ignores and optional
//!   SHA-256 content hashing.
//! - **[`types`]** -- [`FileInfo`], [`Snapshot`], [`DiffResult`].
//! - **[`store`]** -- snapshot persistence with the `"_latest_"` mirror.
//! - **[`service`]** -- scan / changed-since / diff operations.
//! - **[`error`]** -- unified index error types via `thiserror`.

pub mod error;
pub mod service;
pub mod store;
pub mod types;
pub mod walker;

// Re-export the most commonly used types at the crate root.
pub use error::{IndexError, IndexResult};
pub use service::{IdGen, IndexService, diff};
pub use store::{LATEST_KEY, SnapshotStore};
pub use types::{DiffResult, FileInfo, Snapshot};
pub use walker::{FileWalker, FsWalker};

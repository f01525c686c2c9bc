//! Error types for the axle-index crate.

use thiserror::Error;

/// Alias for `Result<T, IndexError>`.
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors that can occur while indexing.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A snapshot id was requested that the store does not hold.
    #[error("snapshot not found: {id}")]
    SnapshotNotFound { id: String },

    /// Walking the filesystem failed.
    #[error("walk failed: {reason}")]
    WalkFailed { reason: String },

    /// An ignore pattern could not be compiled.
    #[error("invalid ignore pattern `{pattern}`: {reason}")]
    InvalidIgnorePattern { pattern: String, reason: String },

    /// The operation was canceled before it could complete.
    #[error("context canceled")]
    Canceled,

    /// The underlying store failed.
    #[error("store error: {0}")]
    Store(#[from] axle_store::StoreError),

    /// Filesystem access failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

//! Error types for the axle-store crate.
//!
//! All storage operations return [`StoreError`] via [`StoreResult`].  The
//! two sentinel conditions every backend agrees on are
//! [`StoreError::AlreadyExists`] and [`StoreError::NotFound`]; callers
//! recover from them locally (upsert fallback, idempotent delete,
//! missing-history-is-empty) wherever the contract says so.

use thiserror::Error;

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `create` was called for a key that already holds a value.
    #[error("resource already exists: {key}")]
    AlreadyExists { key: String },

    /// `update`/`delete`/`get` referenced a key with no value.
    #[error("resource not found: {key}")]
    NotFound { key: String },

    /// Reading or writing a backing file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization or deserialization failed.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Sealing a payload failed (bad key length or cipher failure).
    #[error("encryption failed: {reason}")]
    EncryptionFailed { reason: String },

    /// Opening a payload failed (bad key, truncated or tampered data).
    #[error("decryption failed: {reason}")]
    DecryptionFailed { reason: String },
}

impl StoreError {
    /// Whether this error is the `NotFound` sentinel.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this error is the `AlreadyExists` sentinel.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

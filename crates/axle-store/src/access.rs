//! Generic key/value access contract and its backends.
//!
//! [`Access`] is the storage seam the higher-level stores are written
//! against.  Three backends implement it:
//!
//! - [`MemoryBackend`] -- `DashMap`-backed, process-local.
//! - [`FileBackend`] with [`FileFormat::Json`] -- whole-map JSON file.
//! - [`FileBackend`] with [`FileFormat::Yaml`] -- whole-map YAML file.
//!
//! File backends serialize the entire key->value map on every mutation;
//! they trade throughput for a layout that is trivially inspectable and
//! survives restarts.  All backends are thread-safe.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// Generic asynchronous key/value access.
///
/// `create` on an occupied key fails with [`StoreError::AlreadyExists`];
/// `update` and `delete` on a vacant key fail with
/// [`StoreError::NotFound`].  `read` reports absence as `None`, not as an
/// error.
#[async_trait]
pub trait Access<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    /// Insert a value under a vacant key.
    async fn create(&self, key: K, value: V) -> StoreResult<()>;

    /// Read the value under a key, `None` when absent.
    async fn read(&self, key: &K) -> StoreResult<Option<V>>;

    /// Read every stored value.  Order is unspecified.
    async fn read_all(&self) -> StoreResult<Vec<V>>;

    /// Replace the value under an occupied key.
    async fn update(&self, key: K, value: V) -> StoreResult<()>;

    /// Remove the value under an occupied key.
    async fn delete(&self, key: &K) -> StoreResult<()>;
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// Process-local backend over a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryBackend<K, V>
where
    K: Eq + Hash,
{
    map: DashMap<K, V>,
}

impl<K, V> MemoryBackend<K, V>
where
    K: Eq + Hash,
{
    /// Create an empty backend.
    pub fn new() -> Self {
        Self { map: DashMap::new() }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the backend holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[async_trait]
impl<K, V> Access<K, V> for MemoryBackend<K, V>
where
    K: Eq + Hash + Display + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn create(&self, key: K, value: V) -> StoreResult<()> {
        match self.map.entry(key) {
            Entry::Occupied(entry) => Err(StoreError::AlreadyExists {
                key: entry.key().to_string(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
        }
    }

    async fn read(&self, key: &K) -> StoreResult<Option<V>> {
        Ok(self.map.get(key).map(|entry| entry.value().clone()))
    }

    async fn read_all(&self) -> StoreResult<Vec<V>> {
        Ok(self.map.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn update(&self, key: K, value: V) -> StoreResult<()> {
        match self.map.entry(key) {
            Entry::Occupied(mut entry) => {
                entry.insert(value);
                Ok(())
            }
            Entry::Vacant(entry) => Err(StoreError::NotFound {
                key: entry.key().to_string(),
            }),
        }
    }

    async fn delete(&self, key: &K) -> StoreResult<()> {
        self.map
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// File backend
// ---------------------------------------------------------------------------

/// On-disk serialization format for [`FileBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

/// File-backed backend serializing the whole map on every mutation.
///
/// Keys must serialize to strings (JSON object keys).  A missing file loads
/// as an empty map; the file is created on first write.
pub struct FileBackend<K, V>
where
    K: Eq + Hash,
{
    path: PathBuf,
    format: FileFormat,
    state: Mutex<HashMap<K, V>>,
}

impl<K, V> FileBackend<K, V>
where
    K: Eq + Hash + Display + Serialize + DeserializeOwned + Send + Sync + 'static,
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Open a JSON-serialized backend at `path`.
    pub async fn json(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open(path, FileFormat::Json).await
    }

    /// Open a YAML-serialized backend at `path`.
    pub async fn yaml(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open(path, FileFormat::Yaml).await
    }

    /// Open a backend at `path` with the given format, loading any existing
    /// contents.
    pub async fn open(path: impl AsRef<Path>, format: FileFormat) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => match format {
                FileFormat::Json => serde_json::from_slice(&bytes)?,
                FileFormat::Yaml => serde_yaml::from_slice(&bytes)?,
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), ?format, "file backend opened");

        Ok(Self {
            path,
            format,
            state: Mutex::new(state),
        })
    }

    /// Serialize the current map to the backing file.
    async fn persist(&self, state: &HashMap<K, V>) -> StoreResult<()> {
        let bytes = match self.format {
            FileFormat::Json => serde_json::to_vec_pretty(state)?,
            FileFormat::Yaml => serde_yaml::to_string(state)?.into_bytes(),
        };
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl<K, V> Access<K, V> for FileBackend<K, V>
where
    K: Eq + Hash + Display + Serialize + DeserializeOwned + Send + Sync + 'static,
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn create(&self, key: K, value: V) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        if state.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                key: key.to_string(),
            });
        }
        state.insert(key, value);
        self.persist(&state).await
    }

    async fn read(&self, key: &K) -> StoreResult<Option<V>> {
        let state = self.state.lock().await;
        Ok(state.get(key).cloned())
    }

    async fn read_all(&self) -> StoreResult<Vec<V>> {
        let state = self.state.lock().await;
        Ok(state.values().cloned().collect())
    }

    async fn update(&self, key: K, value: V) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        if !state.contains_key(&key) {
            return Err(StoreError::NotFound {
                key: key.to_string(),
            });
        }
        state.insert(key, value);
        self.persist(&state).await
    }

    async fn delete(&self, key: &K) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        if state.remove(key).is_none() {
            return Err(StoreError::NotFound {
                key: key.to_string(),
            });
        }
        self.persist(&state).await
    }
}

//! Snapshot persistence.
//!
//! Snapshots are stored under their id, and the most recent one is mirrored
//! under the reserved key [`LATEST_KEY`] as a full copy so "latest" survives
//! restarts without a separate pointer record.

use tracing::debug;

use axle_core::SnapshotId;
use axle_store::Access;

use crate::error::{IndexError, IndexResult};
use crate::types::Snapshot;

/// Reserved key the most recent snapshot is mirrored under.
pub const LATEST_KEY: &str = "_latest_";

/// Snapshot store over any key/value backend.
pub struct SnapshotStore<A> {
    access: A,
}

impl<A> SnapshotStore<A>
where
    A: Access<String, Snapshot>,
{
    /// Create a store over the given backend.
    pub fn new(access: A) -> Self {
        Self { access }
    }

    /// Persist a snapshot under its id (upsert), then mirror it under
    /// [`LATEST_KEY`].
    pub async fn save_snapshot(&self, snapshot: &Snapshot) -> IndexResult<()> {
        self.upsert(snapshot.id.to_string(), snapshot.clone()).await?;
        self.upsert(LATEST_KEY.to_string(), snapshot.clone()).await?;

        debug!(snapshot_id = %snapshot.id, files = snapshot.files.len(), "snapshot saved");
        Ok(())
    }

    /// Fetch a snapshot by id.
    ///
    /// # Errors
    ///
    /// [`IndexError::SnapshotNotFound`] when no snapshot has this id.
    pub async fn get_snapshot(&self, id: &SnapshotId) -> IndexResult<Snapshot> {
        self.access
            .read(&id.to_string())
            .await?
            .ok_or_else(|| IndexError::SnapshotNotFound { id: id.to_string() })
    }

    /// Fetch the most recently saved snapshot, or the empty snapshot when
    /// none has ever been saved.
    pub async fn get_latest_snapshot(&self) -> IndexResult<Snapshot> {
        Ok(self
            .access
            .read(&LATEST_KEY.to_string())
            .await?
            .unwrap_or_else(Snapshot::empty))
    }

    async fn upsert(&self, key: String, snapshot: Snapshot) -> IndexResult<()> {
        match self.access.update(key.clone(), snapshot.clone()).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(self.access.create(key, snapshot).await?),
            Err(e) => Err(e.into()),
        }
    }
}

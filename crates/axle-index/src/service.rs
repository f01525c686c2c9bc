//! The indexing service: walk -> snapshot -> diff.

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use axle_core::SnapshotId;
use axle_store::Access;

use crate::error::{IndexError, IndexResult};
use crate::store::SnapshotStore;
use crate::types::{DiffResult, FileInfo, Snapshot};
use crate::walker::FileWalker;

/// Generates snapshot ids.  Injectable so tests get deterministic ids.
pub type IdGen = Box<dyn Fn() -> String + Send + Sync>;

/// Drives scans and diffs over a walker and a snapshot store.
pub struct IndexService<W, A> {
    walker: W,
    store: SnapshotStore<A>,
    id_gen: IdGen,
}

impl<W, A> IndexService<W, A>
where
    W: FileWalker,
    A: Access<String, Snapshot>,
{
    /// Create a service with UUID v7 snapshot ids.
    pub fn new(walker: W, store: SnapshotStore<A>) -> Self {
        Self {
            walker,
            store,
            id_gen: Box::new(|| Uuid::now_v7().to_string()),
        }
    }

    /// Replace the snapshot id generator.
    pub fn with_id_gen(mut self, id_gen: IdGen) -> Self {
        self.id_gen = id_gen;
        self
    }

    /// Walk `roots`, persist the result as a new snapshot, and return it.
    pub async fn scan(
        &self,
        token: &CancellationToken,
        roots: &[String],
        ignore: &[String],
    ) -> IndexResult<Snapshot> {
        if token.is_cancelled() {
            return Err(IndexError::Canceled);
        }

        let files = self.walker.walk(roots, ignore).await?;
        let snapshot = Snapshot {
            id: SnapshotId::new((self.id_gen)()),
            created_at: Utc::now(),
            files,
        };

        self.store.save_snapshot(&snapshot).await?;
        info!(
            snapshot_id = %snapshot.id,
            files = snapshot.files.len(),
            roots = roots.len(),
            "scan complete"
        );
        Ok(snapshot)
    }

    /// Files in the latest snapshot modified strictly after `since`.
    pub async fn changed_since(
        &self,
        token: &CancellationToken,
        since: DateTime<Utc>,
    ) -> IndexResult<Vec<FileInfo>> {
        if token.is_cancelled() {
            return Err(IndexError::Canceled);
        }

        let latest = self.store.get_latest_snapshot().await?;
        Ok(latest
            .files
            .into_iter()
            .filter(|f| f.mod_time > since)
            .collect())
    }

    /// Classify every path across two stored snapshots.
    pub async fn diff_snapshots(
        &self,
        token: &CancellationToken,
        from_id: &SnapshotId,
        to_id: &SnapshotId,
    ) -> IndexResult<DiffResult> {
        if token.is_cancelled() {
            return Err(IndexError::Canceled);
        }

        let from = self.store.get_snapshot(from_id).await?;
        let to = self.store.get_snapshot(to_id).await?;
        Ok(diff(&from, &to))
    }

    /// The snapshot store, for callers that only need reads.
    pub fn store(&self) -> &SnapshotStore<A> {
        &self.store
    }
}

/// Compute the diff between two snapshots.
///
/// A path present in both is changed when the hashes differ (if both sides
/// carry one), or otherwise when size or mtime differ.
pub fn diff(from: &Snapshot, to: &Snapshot) -> DiffResult {
    let from_files = from.by_path();
    let to_files = to.by_path();

    let mut result = DiffResult::default();

    for (path, to_file) in &to_files {
        match from_files.get(path) {
            None => result.added.push((*path).to_string()),
            Some(from_file) => {
                if file_changed(from_file, to_file) {
                    result.changed.push((*path).to_string());
                }
            }
        }
    }

    for path in from_files.keys() {
        if !to_files.contains_key(path) {
            result.removed.push((*path).to_string());
        }
    }

    result.added.sort_unstable();
    result.changed.sort_unstable();
    result.removed.sort_unstable();
    result
}

/// Change detection for a path present in both snapshots: hash comparison
/// when both sides hashed, size/mtime comparison otherwise.
fn file_changed(from: &FileInfo, to: &FileInfo) -> bool {
    if !from.hash.is_empty() && !to.hash.is_empty() {
        return from.hash != to.hash;
    }
    from.size != to.size || from.mod_time != to.mod_time
}

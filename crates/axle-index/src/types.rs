//! Snapshot data model.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use axle_core::SnapshotId;

/// Metadata for one indexed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    /// File path as recorded at walk time.
    pub path: String,

    /// Last modification time.
    pub mod_time: DateTime<Utc>,

    /// Size in bytes.
    pub size: u64,

    /// SHA-256 of the contents as lowercase hex; empty when the walker ran
    /// without content hashing.
    #[serde(default)]
    pub hash: String,
}

/// An immutable point-in-time record of a set of files.
///
/// `files` is a set keyed by `path`; a walker never emits duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Unique identifier.
    pub id: SnapshotId,

    /// When the snapshot was taken.
    pub created_at: DateTime<Utc>,

    /// The indexed files.
    pub files: Vec<FileInfo>,
}

impl Snapshot {
    /// The empty snapshot returned when no snapshot has ever been saved.
    pub fn empty() -> Self {
        Self {
            id: SnapshotId::default(),
            created_at: DateTime::UNIX_EPOCH,
            files: Vec::new(),
        }
    }

    /// Whether this is the empty placeholder snapshot.
    pub fn is_empty(&self) -> bool {
        self.id.as_str().is_empty() && self.files.is_empty()
    }

    /// View the files as a map keyed by path.
    pub fn by_path(&self) -> HashMap<&str, &FileInfo> {
        self.files
            .iter()
            .map(|f| (f.path.as_str(), f))
            .collect()
    }
}

/// Classification of every path across two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Paths present only in the newer snapshot.
    pub added: Vec<String>,

    /// Paths present in both whose contents or metadata differ.
    pub changed: Vec<String>,

    /// Paths present only in the older snapshot.
    pub removed: Vec<String>,
}

impl DiffResult {
    /// Whether nothing was added, changed, or removed.
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> FileInfo {
        FileInfo {
            path: path.into(),
            mod_time: Utc::now(),
            size: 10,
            hash: String::new(),
        }
    }

    #[test]
    fn empty_snapshot_is_empty() {
        let snapshot = Snapshot::empty();
        assert!(snapshot.is_empty());
        assert!(snapshot.files.is_empty());
    }

    #[test]
    fn by_path_keys_every_file() {
        let snapshot = Snapshot {
            id: SnapshotId::from("s1"),
            created_at: Utc::now(),
            files: vec![file("/a"), file("/b")],
        };
        let map = snapshot.by_path();
        assert_eq!(map.len(), 2);
        assert!(map.contains_key("/a"));
        assert!(map.contains_key("/b"));
    }

    #[test]
    fn snapshot_json_roundtrip() {
        let snapshot = Snapshot {
            id: SnapshotId::from("s1"),
            created_at: Utc::now(),
            files: vec![FileInfo {
                path: "/src/main.rs".into(),
                mod_time: "2026-01-05T12:30:00Z".parse().unwrap(),
                size: 1234,
                hash: "abc123".into(),
            }],
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id.as_str(), "s1");
        assert_eq!(back.files.len(), 1);
        assert_eq!(back.files[0].path, "/src/main.rs");
        assert_eq!(back.files[0].size, 1234);
        assert_eq!(back.files[0].hash, "abc123");
        assert_eq!(back.files[0].mod_time, snapshot.files[0].mod_time);
    }
}

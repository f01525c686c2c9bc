//! Filesystem walking.
//!
//! [`FileWalker`] is the seam the index service scans through, so tests can
//! inject a fixed file list.  [`FsWalker`] is the real implementation:
//! recursive traversal with glob-based ignore patterns and optional
//! content hashing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{IndexError, IndexResult};
use crate::types::FileInfo;

/// Produces the file list a snapshot records.
#[async_trait]
pub trait FileWalker: Send + Sync {
    /// Walk `roots`, skipping anything matching `ignore`, and return one
    /// [`FileInfo`] per regular file.
    async fn walk(&self, roots: &[String], ignore: &[String]) -> IndexResult<Vec<FileInfo>>;
}

/// Real filesystem walker.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWalker {
    /// Hash file contents (SHA-256) during the walk.  Slower, but lets the
    /// differ detect content changes that preserve size and mtime.
    pub hash_contents: bool,
}

impl FsWalker {
    /// Create a walker that records metadata only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a walker that also hashes file contents.
    pub fn with_hashing() -> Self {
        Self { hash_contents: true }
    }
}

#[async_trait]
impl FileWalker for FsWalker {
    async fn walk(&self, roots: &[String], ignore: &[String]) -> IndexResult<Vec<FileInfo>> {
        let ignore_set = build_ignore_set(ignore)?;
        let roots = roots.to_vec();
        let hash_contents = self.hash_contents;

        // walkdir is synchronous; run the whole traversal off the runtime.
        tokio::task::spawn_blocking(move || walk_blocking(&roots, &ignore_set, hash_contents))
            .await
            .map_err(|e| IndexError::WalkFailed {
                reason: format!("walk task panicked: {e}"),
            })?
    }
}

/// Compile ignore patterns into a glob set.
fn build_ignore_set(patterns: &[String]) -> IndexResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| IndexError::InvalidIgnorePattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| IndexError::WalkFailed {
        reason: format!("failed to build ignore set: {e}"),
    })
}

/// Whether an entry (by full path or bare name) matches an ignore pattern.
fn is_ignored(entry: &walkdir::DirEntry, ignore: &GlobSet) -> bool {
    if ignore.is_empty() {
        return false;
    }
    if ignore.is_match(entry.path()) {
        return true;
    }
    ignore.is_match(entry.file_name())
}

fn walk_blocking(
    roots: &[String],
    ignore: &GlobSet,
    hash_contents: bool,
) -> IndexResult<Vec<FileInfo>> {
    let mut files = Vec::new();

    for root in roots {
        for entry in WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| !is_ignored(e, ignore))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    // An unreadable subtree should not abort the scan.
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let metadata = entry.metadata().map_err(|e| IndexError::WalkFailed {
                reason: format!("metadata for {}: {e}", entry.path().display()),
            })?;

            let mod_time: DateTime<Utc> = metadata
                .modified()
                .map(DateTime::from)
                .unwrap_or_else(|_| Utc::now());

            let hash = if hash_contents {
                hash_file(entry.path())?
            } else {
                String::new()
            };

            files.push(FileInfo {
                path: entry.path().to_string_lossy().into_owned(),
                mod_time,
                size: metadata.len(),
                hash,
            });
        }
    }

    debug!(count = files.len(), "walk complete");
    Ok(files)
}

/// SHA-256 of a file's contents as lowercase hex.
fn hash_file(path: &std::path::Path) -> IndexResult<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &std::path::Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[tokio::test]
    async fn walks_regular_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.txt"), "alpha");
        touch(&dir.path().join("sub/b.txt"), "beta");

        let walker = FsWalker::new();
        let files = walker
            .walk(&[dir.path().to_string_lossy().into_owned()], &[])
            .await
            .unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.hash.is_empty()));
        assert!(files.iter().any(|f| f.path.ends_with("a.txt")));
        assert!(files.iter().any(|f| f.path.ends_with("b.txt")));
    }

    #[tokio::test]
    async fn ignore_patterns_prune_names_and_subtrees() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("keep.rs"), "fn main() {}");
        touch(&dir.path().join("debug.log"), "noise");
        touch(&dir.path().join("target/deep/artifact.bin"), "bits");

        let walker = FsWalker::new();
        let files = walker
            .walk(
                &[dir.path().to_string_lossy().into_owned()],
                &["*.log".to_string(), "target".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("keep.rs"));
    }

    #[tokio::test]
    async fn hashing_walker_fills_hashes() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("x.txt"), "same");
        touch(&dir.path().join("y.txt"), "same");
        touch(&dir.path().join("z.txt"), "different");

        let walker = FsWalker::with_hashing();
        let mut files = walker
            .walk(&[dir.path().to_string_lossy().into_owned()], &[])
            .await
            .unwrap();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        assert_eq!(files.len(), 3);
        assert_eq!(files[0].hash.len(), 64);
        // Identical contents hash identically; different contents do not.
        assert_eq!(files[0].hash, files[1].hash);
        assert_ne!(files[0].hash, files[2].hash);
    }

    #[tokio::test]
    async fn invalid_ignore_pattern_is_reported() {
        let walker = FsWalker::new();
        let err = walker
            .walk(&["/tmp".to_string()], &["[".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::InvalidIgnorePattern { .. }));
    }
}

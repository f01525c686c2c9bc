//! Indexing tools: JSON-argument adapters over [`IndexService`].
//!
//! Three tools expose the indexer to the model: `index_scan`,
//! `index_changed_since`, and `index_diff_snapshot`.  Each validates its
//! arguments against its definition before touching the service and returns
//! a JSON object rendered to a string.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use axle_core::{
    CoreError, ParameterDefinition, ParameterType, Result, SnapshotId, ToolDefinition,
    ToolHandler, validate_arguments,
};
use axle_index::{FileWalker, IndexService, Snapshot};
use axle_store::Access;

/// Extract an array-of-strings argument, tolerating absence.
fn string_array(args: &serde_json::Map<String, Value>, field: &str) -> Vec<String> {
    args.get(field)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// index_scan
// ---------------------------------------------------------------------------

/// Walks the given paths and persists a new snapshot.
pub struct IndexScanTool<W, A> {
    service: Arc<IndexService<W, A>>,
}

impl<W, A> IndexScanTool<W, A> {
    /// Create the tool over a shared index service.
    pub fn new(service: Arc<IndexService<W, A>>) -> Self {
        Self { service }
    }

    /// The tool's catalog entry.
    pub fn definition() -> ToolDefinition {
        ToolDefinition::new("index_scan", "Index the given paths into a new snapshot")
            .with_parameter(ParameterDefinition::new(
                "paths",
                "Directories or files to index",
                ParameterType::Array,
                true,
            ))
            .with_parameter(ParameterDefinition::new(
                "ignore",
                "Glob patterns to skip (names or paths)",
                ParameterType::Array,
                false,
            ))
    }
}

#[async_trait]
impl<W, A> ToolHandler for IndexScanTool<W, A>
where
    W: FileWalker + 'static,
    A: Access<String, Snapshot> + 'static,
{
    async fn call(&self, args: &str) -> Result<String> {
        let args = validate_arguments(&Self::definition(), args)?;
        let paths = string_array(&args, "paths");
        let ignore = string_array(&args, "ignore");

        debug!(paths = paths.len(), ignore = ignore.len(), "index scan requested");

        let snapshot = self
            .service
            .scan(&CancellationToken::new(), &paths, &ignore)
            .await
            .map_err(|e| CoreError::tool_with_source("index_scan", "scan failed", e))?;

        Ok(json!({
            "snapshot_id": snapshot.id,
            "status": "success",
            "files_indexed": snapshot.files.len(),
            "files_total": snapshot.files.len(),
            "indexed_at": snapshot.created_at.to_rfc3339(),
        })
        .to_string())
    }
}

// ---------------------------------------------------------------------------
// index_changed_since
// ---------------------------------------------------------------------------

/// Lists files in the latest snapshot modified after a timestamp.
pub struct IndexChangedSinceTool<W, A> {
    service: Arc<IndexService<W, A>>,
}

impl<W, A> IndexChangedSinceTool<W, A> {
    /// Create the tool over a shared index service.
    pub fn new(service: Arc<IndexService<W, A>>) -> Self {
        Self { service }
    }

    /// The tool's catalog entry.
    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            "index_changed_since",
            "List files in the latest snapshot modified after the given time",
        )
        .with_parameter(ParameterDefinition::new(
            "since",
            "RFC 3339 timestamp, e.g. \"2026-01-01T00:00:00Z\"",
            ParameterType::String,
            true,
        ))
    }
}

#[async_trait]
impl<W, A> ToolHandler for IndexChangedSinceTool<W, A>
where
    W: FileWalker + 'static,
    A: Access<String, Snapshot> + 'static,
{
    async fn call(&self, args: &str) -> Result<String> {
        let args = validate_arguments(&Self::definition(), args)?;
        let raw_since = args["since"].as_str().unwrap_or_default();

        let since = DateTime::parse_from_rfc3339(raw_since)
            .map_err(|e| {
                CoreError::tool(
                    "index_changed_since",
                    format!("invalid `since` timestamp `{raw_since}`: {e}"),
                )
            })?
            .to_utc();

        let files = self
            .service
            .changed_since(&CancellationToken::new(), since)
            .await
            .map_err(|e| CoreError::tool_with_source("index_changed_since", "query failed", e))?;

        let listed: Vec<Value> = files
            .iter()
            .map(|f| {
                json!({
                    "path": f.path,
                    "mod_time": f.mod_time.to_rfc3339(),
                    "size": f.size,
                })
            })
            .collect();

        Ok(json!({
            "status": "success",
            "count": listed.len(),
            "files": listed,
        })
        .to_string())
    }
}

// ---------------------------------------------------------------------------
// index_diff_snapshot
// ---------------------------------------------------------------------------

/// Diffs two stored snapshots.
pub struct IndexDiffTool<W, A> {
    service: Arc<IndexService<W, A>>,
}

impl<W, A> IndexDiffTool<W, A> {
    /// Create the tool over a shared index service.
    pub fn new(service: Arc<IndexService<W, A>>) -> Self {
        Self { service }
    }

    /// The tool's catalog entry.
    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            "index_diff_snapshot",
            "Classify every path across two snapshots as added, changed, or removed",
        )
        .with_parameter(ParameterDefinition::new(
            "from_id",
            "Id of the older snapshot",
            ParameterType::String,
            true,
        ))
        .with_parameter(ParameterDefinition::new(
            "to_id",
            "Id of the newer snapshot",
            ParameterType::String,
            true,
        ))
    }
}

#[async_trait]
impl<W, A> ToolHandler for IndexDiffTool<W, A>
where
    W: FileWalker + 'static,
    A: Access<String, Snapshot> + 'static,
{
    async fn call(&self, args: &str) -> Result<String> {
        let args = validate_arguments(&Self::definition(), args)?;
        let from_id = SnapshotId::from(args["from_id"].as_str().unwrap_or_default());
        let to_id = SnapshotId::from(args["to_id"].as_str().unwrap_or_default());

        let result = self
            .service
            .diff_snapshots(&CancellationToken::new(), &from_id, &to_id)
            .await
            .map_err(|e| CoreError::tool_with_source("index_diff_snapshot", "diff failed", e))?;

        Ok(json!({
            "status": "success",
            "added": result.added,
            "changed": result.changed,
            "removed": result.removed,
        })
        .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use axle_index::{FileInfo, IndexResult, SnapshotStore};
    use axle_store::MemoryBackend;

    /// Walker yielding a fixed file list.
    struct OneFileWalker;

    #[async_trait]
    impl FileWalker for OneFileWalker {
        async fn walk(&self, _roots: &[String], _ignore: &[String]) -> IndexResult<Vec<FileInfo>> {
            Ok(vec![FileInfo {
                path: "/src/lib.rs".into(),
                mod_time: "2026-05-01T10:00:00Z".parse().unwrap(),
                size: 512,
                hash: "aabb".into(),
            }])
        }
    }

    fn service() -> Arc<IndexService<OneFileWalker, MemoryBackend<String, Snapshot>>> {
        Arc::new(
            IndexService::new(OneFileWalker, SnapshotStore::new(MemoryBackend::new()))
                .with_id_gen(Box::new(|| "snap-1".to_string())),
        )
    }

    #[tokio::test]
    async fn scan_tool_reports_snapshot_metadata() {
        let tool = IndexScanTool::new(service());
        let out = tool.call(r#"{"paths": ["/src"]}"#).await.unwrap();

        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["status"], "success");
        assert_eq!(parsed["snapshot_id"], "snap-1");
        assert_eq!(parsed["files_indexed"], 1);
        assert_eq!(parsed["files_total"], 1);
        assert!(parsed["indexed_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn scan_tool_requires_paths() {
        let tool = IndexScanTool::new(service());
        let err = tool.call("{}").await.unwrap_err();
        assert!(err.to_string().contains("paths"));
    }

    #[tokio::test]
    async fn changed_since_tool_filters_and_reports() {
        let svc = service();
        svc.scan(&CancellationToken::new(), &[], &[]).await.unwrap();

        let tool = IndexChangedSinceTool::new(Arc::clone(&svc));

        let out = tool
            .call(r#"{"since": "2026-01-01T00:00:00Z"}"#)
            .await
            .unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["count"], 1);
        assert_eq!(parsed["files"][0]["path"], "/src/lib.rs");
        assert_eq!(parsed["files"][0]["size"], 512);

        let out = tool
            .call(r#"{"since": "2026-06-01T00:00:00Z"}"#)
            .await
            .unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["count"], 0);
    }

    #[tokio::test]
    async fn changed_since_tool_rejects_bad_timestamps() {
        let tool = IndexChangedSinceTool::new(service());
        let err = tool.call(r#"{"since": "yesterday"}"#).await.unwrap_err();
        assert!(err.to_string().contains("invalid `since` timestamp"));
    }

    #[tokio::test]
    async fn diff_tool_reports_changes() {
        let svc = service();
        let store = svc.store();

        let old = Snapshot {
            id: SnapshotId::from("old"),
            created_at: Utc::now(),
            files: vec![FileInfo {
                path: "/gone.rs".into(),
                mod_time: Utc::now(),
                size: 1,
                hash: "x".into(),
            }],
        };
        let new = Snapshot {
            id: SnapshotId::from("new"),
            created_at: Utc::now(),
            files: vec![FileInfo {
                path: "/fresh.rs".into(),
                mod_time: Utc::now(),
                size: 1,
                hash: "y".into(),
            }],
        };
        store.save_snapshot(&old).await.unwrap();
        store.save_snapshot(&new).await.unwrap();

        let tool = IndexDiffTool::new(svc);
        let out = tool
            .call(r#"{"from_id": "old", "to_id": "new"}"#)
            .await
            .unwrap();

        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["status"], "success");
        assert_eq!(parsed["added"], json!(["/fresh.rs"]));
        assert_eq!(parsed["removed"], json!(["/gone.rs"]));
        assert_eq!(parsed["changed"], json!([]));
    }

    #[tokio::test]
    async fn diff_tool_surfaces_missing_snapshots() {
        let tool = IndexDiffTool::new(service());
        let err = tool
            .call(r#"{"from_id": "a", "to_id": "b"}"#)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("diff failed"));
    }
}

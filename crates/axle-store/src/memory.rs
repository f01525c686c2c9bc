//! Memory notes: long-lived facts the agent can write and recall.
//!
//! A [`MemoryNote`] carries raw content plus a summary, context
//! description, keywords, tags, an importance score in `[1..5]`, and an
//! optional embedding vector.  [`MemoryStore`] layers scoped filtering,
//! text search, and cosine-ranked vector search over any
//! `Access<String, MemoryNote>` backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use axle_core::NoteId;

use crate::access::Access;
use crate::error::{StoreError, StoreResult};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where a memory note originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Distilled from a conversation turn.
    Conversation,
    /// Produced while driving a task.
    Task,
    /// Emitted by a tool.
    Tool,
    /// Written explicitly by the user or embedder.
    Manual,
}

/// A single memory note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryNote {
    /// Unique identifier.
    pub id: NoteId,

    /// Where the note came from.
    pub source_type: SourceType,

    /// Optional owning user scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Optional session scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Optional task scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    /// The full content of the note.
    pub raw_content: String,

    /// A short summary.
    #[serde(default)]
    pub summary: String,

    /// Free-text description of the context the note was captured in.
    #[serde(default)]
    pub context_description: String,

    /// Keywords for lookup.
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Grouping tags.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Importance in `[1..5]`; the primary ranking key for text search.
    pub importance: u8,

    /// Optional embedding of the note's content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    /// When the note was created.
    pub created_at: DateTime<Utc>,

    /// When the note was last written.
    pub updated_at: DateTime<Utc>,
}

impl MemoryNote {
    /// Create a note with a fresh id, clamping importance into `[1..5]`.
    pub fn new(source_type: SourceType, raw_content: impl Into<String>, importance: u8) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::new(Uuid::now_v7().to_string()),
            source_type,
            user_id: None,
            session_id: None,
            task_id: None,
            raw_content: raw_content.into(),
            summary: String::new(),
            context_description: String::new(),
            keywords: Vec::new(),
            tags: Vec::new(),
            importance: importance.clamp(1, 5),
            embedding: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The concatenation text search runs against: raw content, summary,
    /// and context description separated by single spaces.
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {} {}",
            self.raw_content, self.summary, self.context_description
        )
    }
}

/// Filters applied before any ranking.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Drop notes with importance below this value (0 disables).
    pub min_importance: u8,

    /// Restrict to a user scope.
    pub user_id: Option<String>,

    /// Restrict to a session scope.
    pub session_id: Option<String>,

    /// Restrict to a task scope.
    pub task_id: Option<String>,

    /// Restrict to these source types (empty = all).
    pub source_types: Vec<SourceType>,

    /// Keep notes carrying any of these tags (empty = all).
    pub tags: Vec<String>,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Memory-note store over any key/value backend.
pub struct MemoryStore<A> {
    access: A,
}

impl<A> MemoryStore<A>
where
    A: Access<String, MemoryNote>,
{
    /// Create a store over the given backend.
    pub fn new(access: A) -> Self {
        Self { access }
    }

    /// Write a note (upsert), bumping `updated_at`.
    pub async fn write(&self, mut note: MemoryNote) -> StoreResult<()> {
        note.updated_at = Utc::now();
        let key = note.id.to_string();

        debug!(note_id = %note.id, source = ?note.source_type, "memory note written");

        match self.access.update(key.clone(), note.clone()).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => self.access.create(key, note).await,
            Err(e) => Err(e),
        }
    }

    /// Fetch a note by id.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when no note has this id.
    pub async fn get(&self, id: &NoteId) -> StoreResult<MemoryNote> {
        self.access
            .read(&id.to_string())
            .await?
            .ok_or_else(|| StoreError::NotFound { key: id.to_string() })
    }

    /// Delete a note; absence is not an error.
    pub async fn delete(&self, id: &NoteId) -> StoreResult<()> {
        match self.access.delete(&id.to_string()).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Text search: filter by `opts`, test `query` against each candidate,
    /// sort by importance descending, truncate to `limit` (0 = unbounded).
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        opts: &SearchOptions,
    ) -> StoreResult<Vec<MemoryNote>> {
        let mut notes: Vec<MemoryNote> = self
            .access
            .read_all()
            .await?
            .into_iter()
            .filter(|note| passes_filters(note, opts))
            .filter(|note| query_matches(note, query))
            .collect();

        notes.sort_by(|a, b| b.importance.cmp(&a.importance));
        if limit > 0 {
            notes.truncate(limit);
        }
        Ok(notes)
    }

    /// Vector search: filter by `opts`, rank by cosine similarity against
    /// `query_embedding`, truncate to `limit` (0 = unbounded).
    ///
    /// Without a query embedding this degrades to the importance ordering
    /// of [`search`](Self::search); notes without an embedding (or with a
    /// mismatched length) score 0 and sink to the bottom.
    pub async fn search_with_embedding(
        &self,
        _query: &str,
        query_embedding: Option<&[f32]>,
        limit: usize,
        opts: &SearchOptions,
    ) -> StoreResult<Vec<MemoryNote>> {
        let candidates: Vec<MemoryNote> = self
            .access
            .read_all()
            .await?
            .into_iter()
            .filter(|note| passes_filters(note, opts))
            .collect();

        let Some(query_embedding) = query_embedding else {
            let mut notes = candidates;
            notes.sort_by(|a, b| b.importance.cmp(&a.importance));
            if limit > 0 {
                notes.truncate(limit);
            }
            return Ok(notes);
        };

        let mut scored: Vec<(f32, MemoryNote)> = candidates
            .into_iter()
            .map(|note| {
                let score = note
                    .embedding
                    .as_deref()
                    .map(|emb| cosine_similarity(query_embedding, emb))
                    .unwrap_or(0.0);
                (score, note)
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        if limit > 0 {
            scored.truncate(limit);
        }
        Ok(scored.into_iter().map(|(_, note)| note).collect())
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Apply the scope/importance/source/tag filters.
fn passes_filters(note: &MemoryNote, opts: &SearchOptions) -> bool {
    if opts.min_importance > 0 && note.importance < opts.min_importance {
        return false;
    }
    if let Some(user_id) = &opts.user_id {
        if note.user_id.as_deref() != Some(user_id.as_str()) {
            return false;
        }
    }
    if let Some(session_id) = &opts.session_id {
        if note.session_id.as_deref() != Some(session_id.as_str()) {
            return false;
        }
    }
    if let Some(task_id) = &opts.task_id {
        if note.task_id.as_deref() != Some(task_id.as_str()) {
            return false;
        }
    }
    if !opts.source_types.is_empty() && !opts.source_types.contains(&note.source_type) {
        return false;
    }
    if !opts.tags.is_empty() && !opts.tags.iter().any(|t| note.tags.contains(t)) {
        return false;
    }
    true
}

/// Test the query against a note.
///
/// A note matches when its searchable text contains the query
/// (case-insensitive), or when any query word and any keyword contain each
/// other as substrings, in either direction.
fn query_matches(note: &MemoryNote, query: &str) -> bool {
    let query_lower = query.to_lowercase();
    if note
        .searchable_text()
        .to_lowercase()
        .contains(&query_lower)
    {
        return true;
    }

    query_lower.split_whitespace().any(|word| {
        note.keywords.iter().any(|keyword| {
            let keyword = keyword.to_lowercase();
            keyword.contains(word) || word.contains(keyword.as_str())
        })
    })
}

/// Cosine similarity between two vectors; 0 when either is empty or the
/// lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::access::MemoryBackend;

    fn store() -> MemoryStore<MemoryBackend<String, MemoryNote>> {
        MemoryStore::new(MemoryBackend::new())
    }

    fn note(content: &str, importance: u8) -> MemoryNote {
        MemoryNote::new(SourceType::Manual, content, importance)
    }

    #[tokio::test]
    async fn write_get_delete() {
        let store = store();
        let n = note("the user prefers dark mode", 4);
        let id = n.id.clone();

        store.write(n).await.unwrap();
        let fetched = store.get(&id).await.unwrap();
        assert_eq!(fetched.raw_content, "the user prefers dark mode");

        store.delete(&id).await.unwrap();
        assert!(store.get(&id).await.unwrap_err().is_not_found());

        // Deleting again is fine.
        store.delete(&id).await.unwrap();
    }

    #[tokio::test]
    async fn write_is_upsert() {
        let store = store();
        let mut n = note("v1", 2);
        let id = n.id.clone();
        store.write(n.clone()).await.unwrap();

        n.raw_content = "v2".into();
        store.write(n).await.unwrap();

        assert_eq!(store.get(&id).await.unwrap().raw_content, "v2");
    }

    #[tokio::test]
    async fn search_matches_substring_case_insensitive() {
        let store = store();
        store.write(note("The GERMAN word for cat is Katze", 3)).await.unwrap();
        store.write(note("unrelated fact", 5)).await.unwrap();

        let hits = store
            .search("german", 0, &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].raw_content.contains("GERMAN"));
    }

    #[tokio::test]
    async fn search_keyword_match_is_bidirectional() {
        let store = store();
        let mut n = note("a note about languages", 3);
        n.keywords = vec!["ger".into()];
        store.write(n).await.unwrap();

        // The query word contains the keyword...
        let hits = store
            .search("german", 0, &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        // ...and a keyword containing the query word also matches.
        let mut n2 = note("another note", 3);
        n2.keywords = vec!["germany".into()];
        store.write(n2).await.unwrap();

        let hits = store
            .search("german", 0, &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn search_sorts_by_importance_and_truncates() {
        let store = store();
        store.write(note("shared topic alpha", 1)).await.unwrap();
        store.write(note("shared topic beta", 5)).await.unwrap();
        store.write(note("shared topic gamma", 3)).await.unwrap();

        let hits = store
            .search("shared topic", 2, &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].importance, 5);
        assert_eq!(hits[1].importance, 3);

        // limit 0 means no truncation.
        let all = store
            .search("shared topic", 0, &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn search_applies_filters() {
        let store = store();

        let mut scoped = note("scoped fact", 3);
        scoped.user_id = Some("u1".into());
        scoped.tags = vec!["project".into()];
        store.write(scoped).await.unwrap();

        let mut other = note("other fact", 5);
        other.user_id = Some("u2".into());
        store.write(other).await.unwrap();

        let opts = SearchOptions {
            user_id: Some("u1".into()),
            ..SearchOptions::default()
        };
        let hits = store.search("fact", 0, &opts).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].user_id.as_deref(), Some("u1"));

        let opts = SearchOptions {
            tags: vec!["project".into()],
            ..SearchOptions::default()
        };
        let hits = store.search("fact", 0, &opts).await.unwrap();
        assert_eq!(hits.len(), 1);

        let opts = SearchOptions {
            min_importance: 4,
            ..SearchOptions::default()
        };
        let hits = store.search("fact", 0, &opts).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].importance, 5);
    }

    #[tokio::test]
    async fn embedding_search_ranks_by_cosine() {
        let store = store();

        let mut close = note("close", 1);
        close.embedding = Some(vec![1.0, 0.0]);
        store.write(close).await.unwrap();

        let mut far = note("far", 5);
        far.embedding = Some(vec![0.0, 1.0]);
        store.write(far).await.unwrap();

        let mut missing = note("no embedding", 5);
        missing.embedding = None;
        store.write(missing).await.unwrap();

        let hits = store
            .search_with_embedding("", Some(&[1.0, 0.0]), 0, &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(hits[0].raw_content, "close");
        // Notes without an embedding score 0 and never outrank real matches.
        assert_ne!(hits[0].raw_content, "no embedding");
    }

    #[tokio::test]
    async fn embedding_search_falls_back_to_importance() {
        let store = store();
        store.write(note("a", 1)).await.unwrap();
        store.write(note("b", 5)).await.unwrap();

        let hits = store
            .search_with_embedding("", None, 0, &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(hits[0].importance, 5);
    }

    #[test]
    fn cosine_edge_cases() {
        assert_eq!(cosine_similarity(&[], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);

        let sim = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]);
        assert!((sim - 1.0).abs() < 1e-6);
    }
}

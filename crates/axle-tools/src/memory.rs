//! Memory tools: let the model write and recall notes.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use axle_core::{
    CoreError, ParameterDefinition, ParameterType, Result, ToolDefinition, ToolHandler,
    validate_arguments,
};
use axle_store::{Access, MemoryNote, MemoryStore, SearchOptions, SourceType};

fn string_list(args: &serde_json::Map<String, Value>, field: &str) -> Vec<String> {
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
// memory_remember
// ---------------------------------------------------------------------------

/// Persists a new memory note.
pub struct MemoryRememberTool<A> {
    store: Arc<MemoryStore<A>>,
}

impl<A> MemoryRememberTool<A> {
    /// Create the tool over a shared note store.
    pub fn new(store: Arc<MemoryStore<A>>) -> Self {
        Self { store }
    }

    /// The tool's catalog entry.
    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            "memory_remember",
            "Store a fact worth recalling in later conversations",
        )
        .with_parameter(ParameterDefinition::new(
            "content",
            "The fact to remember",
            ParameterType::String,
            true,
        ))
        .with_parameter(ParameterDefinition::new(
            "summary",
            "One-line summary of the fact",
            ParameterType::String,
            false,
        ))
        .with_parameter(ParameterDefinition::new(
            "keywords",
            "Lookup keywords",
            ParameterType::Array,
            false,
        ))
        .with_parameter(ParameterDefinition::new(
            "tags",
            "Grouping tags",
            ParameterType::Array,
            false,
        ))
        .with_parameter(
            ParameterDefinition::new(
                "importance",
                "Importance from 1 (trivial) to 5 (critical)",
                ParameterType::Integer,
                false,
            )
            .with_default(json!(3)),
        )
    }
}

#[async_trait]
impl<A> ToolHandler for MemoryRememberTool<A>
where
    A: Access<String, MemoryNote> + 'static,
{
    async fn call(&self, args: &str) -> Result<String> {
        let args = validate_arguments(&Self::definition(), args)?;

        let content = args["content"].as_str().unwrap_or_default();
        // Validation admits whole-valued floats for integer parameters.
        let importance = args
            .get("importance")
            .and_then(|v| v.as_f64())
            .map(|v| v as u8)
            .unwrap_or(3);

        let mut note = MemoryNote::new(SourceType::Tool, content, importance);
        if let Some(summary) = args.get("summary").and_then(|v| v.as_str()) {
            note.summary = summary.to_string();
        }
        note.keywords = string_list(&args, "keywords");
        note.tags = string_list(&args, "tags");

        let id = note.id.clone();
        debug!(note_id = %id, importance, "remembering note");

        self.store
            .write(note)
            .await
            .map_err(|e| CoreError::tool_with_source("memory_remember", "write failed", e))?;

        Ok(json!({ "id": id, "saved": true }).to_string())
    }
}

// ---------------------------------------------------------------------------
// memory_recall
// ---------------------------------------------------------------------------

/// Searches stored notes by text.
pub struct MemoryRecallTool<A> {
    store: Arc<MemoryStore<A>>,
}

impl<A> MemoryRecallTool<A> {
    /// Create the tool over a shared note store.
    pub fn new(store: Arc<MemoryStore<A>>) -> Self {
        Self { store }
    }

    /// The tool's catalog entry.
    pub fn definition() -> ToolDefinition {
        ToolDefinition::new("memory_recall", "Search previously stored memories")
            .with_parameter(ParameterDefinition::new(
                "query",
                "Text to search for",
                ParameterType::String,
                true,
            ))
            .with_parameter(
                ParameterDefinition::new(
                    "limit",
                    "Maximum number of results",
                    ParameterType::Integer,
                    false,
                )
                .with_default(json!(5)),
            )
    }
}

#[async_trait]
impl<A> ToolHandler for MemoryRecallTool<A>
where
    A: Access<String, MemoryNote> + 'static,
{
    async fn call(&self, args: &str) -> Result<String> {
        let args = validate_arguments(&Self::definition(), args)?;

        let query = args["query"].as_str().unwrap_or_default();
        let limit = args
            .get("limit")
            .and_then(|v| v.as_f64())
            .map(|v| v as usize)
            .unwrap_or(5);

        debug!(query, limit, "recalling notes");

        let notes = self
            .store
            .search(query, limit, &SearchOptions::default())
            .await
            .map_err(|e| CoreError::tool_with_source("memory_recall", "search failed", e))?;

        let results: Vec<Value> = notes
            .iter()
            .map(|note| {
                json!({
                    "id": note.id,
                    "content": note.raw_content,
                    "summary": note.summary,
                    "importance": note.importance,
                })
            })
            .collect();

        Ok(json!({ "count": results.len(), "results": results }).to_string())
    }
}

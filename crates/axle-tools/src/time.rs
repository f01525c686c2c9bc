//! Current-time tool.

use async_trait::async_trait;
use chrono::Utc;

use axle_core::{Result, ToolDefinition, ToolHandler};

/// Returns the current time as an RFC 3339 timestamp.  Takes no arguments.
pub struct CurrentTimeTool;

impl CurrentTimeTool {
    /// The tool's catalog entry.
    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            "get_current_time",
            "Get the current date and time as an RFC 3339 timestamp",
        )
    }
}

#[async_trait]
impl ToolHandler for CurrentTimeTool {
    async fn call(&self, _args: &str) -> Result<String> {
        Ok(Utc::now().to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_a_parseable_timestamp() {
        let out = CurrentTimeTool.call("").await.unwrap();
        let parsed = chrono::DateTime::parse_from_rfc3339(&out);
        assert!(parsed.is_ok(), "not RFC 3339: {out}");
    }

    #[test]
    fn definition_has_no_parameters() {
        let def = CurrentTimeTool::definition();
        assert_eq!(def.name, "get_current_time");
        assert!(def.parameters.is_empty());
    }
}

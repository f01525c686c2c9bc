//! The tool handler contract.

use async_trait::async_trait;

use crate::error::Result;

// The executor and every built-in tool speak this trait, so it lives here
// rather than in the executor crate.

/// An executable tool.
///
/// Handlers receive the raw JSON argument string exactly as the model
/// produced it and return the string fed back to the model.  Argument
/// validation (via [`crate::tool::validate_arguments`]) is the handler's
/// responsibility, so tools that take no arguments can skip parsing
/// entirely.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool with the given raw JSON arguments.
    async fn call(&self, args: &str) -> Result<String>;
}

/// Adapter turning an async closure into a [`ToolHandler`].
///
/// The closure receives the argument string by value so the returned future
/// does not borrow from the call.
pub struct FnTool<F>(pub F);

#[async_trait]
impl<F, Fut> ToolHandler for FnTool<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<String>> + Send,
{
    async fn call(&self, args: &str) -> Result<String> {
        (self.0)(args.to_owned()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closure_tool_executes() {
        let tool = FnTool(|args: String| async move { Ok(format!("echo: {args}")) });
        let out = tool.call("{\"x\":1}").await.unwrap();
        assert_eq!(out, "echo: {\"x\":1}");
    }
}

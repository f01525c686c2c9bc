//! Tool schema, argument validation, and the handler contract.
//!
//! A tool is declared with a [`ToolDefinition`] (name, description, ordered
//! parameter list) and implemented with a [`ToolHandler`].  The two are
//! registered independently with the executor; [`validate_arguments`] checks
//! a call's raw JSON payload against the definition before a handler runs.

mod definition;
mod handler;
mod validate;

pub use definition::{ParameterDefinition, ParameterType, ToolDefinition};
pub use handler::{FnTool, ToolHandler};
pub use validate::validate_arguments;

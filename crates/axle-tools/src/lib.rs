//! Built-in tools for the axle agent engine.
//!
//! Every tool pairs a [`axle_core::ToolHandler`] implementation with a
//! `definition()` describing its parameters, ready to hand to a tool
//! registry:
//!
//! - **[`time`]** -- `get_current_time`.
//! - **[`calc`]** -- `calculate`, a recursive-descent arithmetic evaluator.
//! - **[`index`]** -- `index_scan`, `index_changed_since`,
//!   `index_diff_snapshot` over an [`axle_index::IndexService`].
//! - **[`memory`]** -- `memory_remember` and `memory_recall` over an
//!   [`axle_store::MemoryStore`].

pub mod calc;
pub mod index;
pub mod memory;
pub mod time;

// Re-export the tool types at the crate root.
pub use calc::CalculatorTool;
pub use index::{IndexChangedSinceTool, IndexDiffTool, IndexScanTool};
pub use memory::{MemoryRecallTool, MemoryRememberTool};
pub use time::CurrentTimeTool;

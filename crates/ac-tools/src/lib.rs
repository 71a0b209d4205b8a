//! Tool registry and timeout-bounded dispatch.
//!
//! No concrete tools are shipped here; callers register implementations of the
//! `Tool` trait and the registry handles name resolution, schema export, and
//! per-call timeouts uniformly.

pub mod registry;
pub mod result;
pub mod tool;

pub use registry::ToolRegistry;
pub use result::ToolResult;
pub use tool::{Tool, ToolContext, ToolError};

//! Shared data model and runtime primitives for the agent execution engine.
//!
//! Every other crate in the workspace depends on this one: the message/tool-call
//! model, the session entry log, the shared error type, the cancellation token and
//! the structured trace events all live here so that `ac-sessions`, `ac-context`,
//! `ac-prompt`, `ac-llm`, `ac-tools`, `ac-flow` and `ac-engine` share one vocabulary.

pub mod cancel;
pub mod entry;
pub mod error;
pub mod tool;
pub mod trace;

pub use cancel::CancelToken;
pub use entry::SessionEntry;
pub use error::{Error, Result};
pub use tool::{ContentPart, Message, MessageContent, Role, ToolCall, ToolDefinition};
pub use trace::TraceEvent;

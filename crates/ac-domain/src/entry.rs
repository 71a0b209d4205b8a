use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tool::Message;

/// One unit of a session's append-only history.
///
/// Entries are never mutated after append; `id`, `timestamp` and `metadata` are
/// common to every variant so a reader can sort/filter without matching the kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SessionEntry {
    #[serde(rename = "message")]
    Message(MessageEntry),
    #[serde(rename = "tool_call")]
    ToolCall(ToolCallEntry),
    #[serde(rename = "tool_result")]
    ToolResult(ToolResultEntry),
    #[serde(rename = "thinking")]
    Thinking(ThinkingEntry),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub message: Message,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub tool_name: String,
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub tool_name: String,
    pub success: bool,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkingEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub text: String,
}

impl SessionEntry {
    pub fn id(&self) -> &str {
        match self {
            SessionEntry::Message(e) => &e.id,
            SessionEntry::ToolCall(e) => &e.id,
            SessionEntry::ToolResult(e) => &e.id,
            SessionEntry::Thinking(e) => &e.id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SessionEntry::Message(e) => e.timestamp,
            SessionEntry::ToolCall(e) => e.timestamp,
            SessionEntry::ToolResult(e) => e.timestamp,
            SessionEntry::Thinking(e) => e.timestamp,
        }
    }

    pub fn metadata(&self) -> &HashMap<String, serde_json::Value> {
        match self {
            SessionEntry::Message(e) => &e.metadata,
            SessionEntry::ToolCall(e) => &e.metadata,
            SessionEntry::ToolResult(e) => &e.metadata,
            SessionEntry::Thinking(e) => &e.metadata,
        }
    }

    pub fn message(message: Message) -> Self {
        SessionEntry::Message(MessageEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            metadata: HashMap::new(),
            message,
        })
    }

    pub fn tool_call(tool_name: impl Into<String>, params: serde_json::Value) -> Self {
        SessionEntry::ToolCall(ToolCallEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            metadata: HashMap::new(),
            tool_name: tool_name.into(),
            params,
        })
    }

    pub fn tool_result(
        tool_name: impl Into<String>,
        result: Option<serde_json::Value>,
        error: Option<String>,
    ) -> Self {
        let success = error.is_none();
        SessionEntry::ToolResult(ToolResultEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            metadata: HashMap::new(),
            tool_name: tool_name.into(),
            success,
            result,
            error,
        })
    }

    pub fn thinking(text: impl Into<String>) -> Self {
        SessionEntry::Thinking(ThinkingEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            metadata: HashMap::new(),
            text: text.into(),
        })
    }
}

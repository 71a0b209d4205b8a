use ac_domain::entry::SessionEntry;
use ac_domain::tool::Role;
use ac_sessions::Session;

use crate::{ContextProvider, Fragment};

fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    }
}

/// Converts the most recent `limit` session entries into fragments.
///
/// Message entries become `history`-tagged fragments carrying the original role
/// in `metadata["original_role"]`; tool-call/tool-result entries become
/// `tool_call`/`tool_result`-tagged fragments with a conventional textual
/// rendering. Thinking entries are skipped by this baseline provider — see
/// `ThinkingProvider` if reasoning replay is wanted.
pub struct HistoryProvider {
    limit: usize,
}

impl HistoryProvider {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl ContextProvider for HistoryProvider {
    fn type_tag(&self) -> &str {
        "history"
    }

    fn provide(&self, session: &Session) -> Vec<Fragment> {
        session
            .history(self.limit)
            .iter()
            .filter_map(|entry| entry_to_fragment(entry))
            .collect()
    }
}

fn entry_to_fragment(entry: &SessionEntry) -> Option<Fragment> {
    let base = |f: Fragment| {
        f.with_metadata("entry_id", serde_json::json!(entry.id()))
            .with_metadata("timestamp", serde_json::json!(entry.timestamp().to_rfc3339()))
    };

    match entry {
        SessionEntry::Message(m) => {
            let content = m.message.content.extract_all_text();
            let fragment = Fragment::new("history", content)
                .with_metadata("original_role", serde_json::json!(role_str(m.message.role)));
            Some(base(fragment))
        }
        SessionEntry::ToolCall(t) => {
            let content = format!("Tool: {}\nParameters: {}", t.tool_name, t.params);
            let fragment = Fragment::new("tool_call", content)
                .with_metadata("tool_name", serde_json::json!(t.tool_name));
            Some(base(fragment))
        }
        SessionEntry::ToolResult(r) => {
            let outcome = if r.success {
                format!(
                    "Result: {}",
                    r.result.clone().unwrap_or(serde_json::Value::Null)
                )
            } else {
                format!("Error: {}", r.error.clone().unwrap_or_default())
            };
            let content = format!("Tool: {}\nSuccess: {}\n{}", r.tool_name, r.success, outcome);
            let fragment = Fragment::new("tool_result", content)
                .with_metadata("tool_name", serde_json::json!(r.tool_name))
                .with_metadata("success", serde_json::json!(r.success));
            Some(base(fragment))
        }
        SessionEntry::Thinking(_) => None,
    }
}

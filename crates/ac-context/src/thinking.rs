use ac_domain::entry::SessionEntry;
use ac_sessions::Session;

use crate::{ContextProvider, Fragment};

/// Surfaces `ThinkingEntry` history as `thinking`-tagged fragments.
///
/// Disabled by default in the baseline `HistoryProvider` (which skips thinking
/// entries); register this alongside it for callers that want reasoning replay
/// in the rendered prompt.
pub struct ThinkingProvider {
    limit: usize,
}

impl ThinkingProvider {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl ContextProvider for ThinkingProvider {
    fn type_tag(&self) -> &str {
        "thinking"
    }

    fn provide(&self, session: &Session) -> Vec<Fragment> {
        session
            .history(self.limit)
            .iter()
            .filter_map(|entry| match entry {
                SessionEntry::Thinking(t) => Some(
                    Fragment::new("thinking", t.text.clone())
                        .with_metadata("entry_id", serde_json::json!(t.id))
                        .with_metadata("timestamp", serde_json::json!(t.timestamp.to_rfc3339())),
                ),
                _ => None,
            })
            .collect()
    }
}

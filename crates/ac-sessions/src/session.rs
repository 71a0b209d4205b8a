use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ac_domain::SessionEntry;

/// Options accepted by `SessionStore::create`.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Use this id instead of minting a fresh uuid. Caller is responsible for
    /// uniqueness; the store rejects a collision.
    pub id: Option<String>,
    /// Time-to-live from creation. `None` (or zero) means the session never
    /// expires.
    pub ttl: Option<Duration>,
    pub initial_metadata: HashMap<String, serde_json::Value>,
}

/// A session: an ordered history of entries plus a scratchpad for engine- and
/// caller-owned state.
///
/// Entries are never mutated after append; `add_entry`/`add_entries` are the only
/// way new history is produced, and both bump `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    entries: Vec<SessionEntry>,
    scratchpad: HashMap<String, serde_json::Value>,
}

impl Session {
    pub fn new(id: String, options: &CreateOptions) -> Self {
        let now = Utc::now();
        let expires_at = options
            .ttl
            .filter(|d| !d.is_zero())
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map(|d| now + d);

        Self {
            id,
            created_at: now,
            updated_at: now,
            expires_at,
            entries: Vec::new(),
            scratchpad: options.initial_metadata.clone(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| now >= exp).unwrap_or(false)
    }

    pub fn add_entry(&mut self, entry: SessionEntry) {
        self.entries.push(entry);
        self.updated_at = Utc::now();
    }

    pub fn add_entries(&mut self, entries: impl IntoIterator<Item = SessionEntry>) {
        let mut any = false;
        for entry in entries {
            self.entries.push(entry);
            any = true;
        }
        if any {
            self.updated_at = Utc::now();
        }
    }

    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    /// The most recent `limit` entries, in chronological order. `limit == 0`
    /// means no limit (the full history).
    pub fn history(&self, limit: usize) -> &[SessionEntry] {
        if limit == 0 || limit >= self.entries.len() {
            &self.entries
        } else {
            &self.entries[self.entries.len() - limit..]
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.scratchpad.insert(key.into(), value);
        self.updated_at = Utc::now();
    }

    /// Update the scratchpad without touching `updated_at` (used for the store's
    /// `touch` operation, which intentionally bumps the timestamp itself instead).
    pub fn set_quiet(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.scratchpad.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.scratchpad.get(key)
    }

    pub fn scratchpad(&self) -> &HashMap<String, serde_json::Value> {
        &self.scratchpad
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_domain::tool::Message;

    #[test]
    fn new_session_has_no_expiry_by_default() {
        let session = Session::new("s1".into(), &CreateOptions::default());
        assert!(session.expires_at.is_none());
        assert!(!session.is_expired(Utc::now()));
    }

    #[test]
    fn ttl_of_zero_means_no_expiry() {
        let options = CreateOptions {
            ttl: Some(Duration::ZERO),
            ..Default::default()
        };
        let session = Session::new("s1".into(), &options);
        assert!(session.expires_at.is_none());
    }

    #[test]
    fn history_returns_most_recent_n_in_chronological_order() {
        let mut session = Session::new("s1".into(), &CreateOptions::default());
        for i in 0..5 {
            session.add_entry(SessionEntry::message(Message::user(format!("msg {i}"))));
        }
        let last_two = session.history(2);
        assert_eq!(last_two.len(), 2);
        if let SessionEntry::Message(m) = &last_two[0] {
            assert_eq!(m.message.content.text(), Some("msg 3"));
        } else {
            panic!("expected message entry");
        }
        if let SessionEntry::Message(m) = &last_two[1] {
            assert_eq!(m.message.content.text(), Some("msg 4"));
        } else {
            panic!("expected message entry");
        }
    }

    #[test]
    fn history_limit_zero_returns_everything() {
        let mut session = Session::new("s1".into(), &CreateOptions::default());
        for i in 0..3 {
            session.add_entry(SessionEntry::message(Message::user(format!("msg {i}"))));
        }
        assert_eq!(session.history(0).len(), 3);
    }

    #[test]
    fn add_entry_bumps_updated_at() {
        let mut session = Session::new("s1".into(), &CreateOptions::default());
        let before = session.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        session.add_entry(SessionEntry::message(Message::user("hi")));
        assert!(session.updated_at >= before);
    }
}

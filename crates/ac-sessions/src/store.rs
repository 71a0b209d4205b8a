//! In-memory reference `SessionStore`.
//!
//! Two-tier locking: a `parking_lot::RwLock` guards the id → session map itself
//! (fast path for lookups that don't mutate), while each session's mutation goes
//! through a clone-then-install cycle so readers never observe a torn write.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;

use ac_domain::trace::TraceEvent;
use ac_domain::CancelToken;

use crate::session::{CreateOptions, Session};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("session expired: {0}")]
    Expired(String),
    #[error("session id already exists: {0}")]
    AlreadyExists(String),
    #[error("cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Filter accepted by `SessionStore::list`. An empty filter matches every
/// non-expired session.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub id_prefix: Option<String>,
}

impl SessionFilter {
    fn matches(&self, session: &Session) -> bool {
        match &self.id_prefix {
            Some(prefix) => session.id.starts_with(prefix.as_str()),
            None => true,
        }
    }
}

/// The capability interface the engine depends on. A durable backend (disk, DB)
/// implements the same contract; `InMemorySessionStore` is the reference
/// implementation used in tests and as the default.
///
/// Every method accepts the turn's `CancelToken` so a backend whose operations
/// can genuinely suspend (a network round trip, a slow disk write) has a place
/// to honor a deadline. `InMemorySessionStore` has no such suspension point; it
/// only checks the token once, at entry.
pub trait SessionStore: Send + Sync {
    fn create(&self, options: CreateOptions, cancel: &CancelToken) -> Result<Session>;
    fn get(&self, id: &str, cancel: &CancelToken) -> Result<Session>;
    fn save(&self, session: &Session, cancel: &CancelToken) -> Result<()>;
    fn delete(&self, id: &str, cancel: &CancelToken) -> Result<()>;
    fn exists(&self, id: &str, cancel: &CancelToken) -> bool;
    fn list(&self, filter: &SessionFilter, cancel: &CancelToken) -> Vec<String>;
    fn get_history(&self, id: &str, n: usize, cancel: &CancelToken) -> Result<Vec<ac_domain::SessionEntry>>;
    fn touch(&self, id: &str, cancel: &CancelToken) -> Result<()>;
}

pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, options: CreateOptions, cancel: &CancelToken) -> Result<Session> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let id = options
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let mut sessions = self.sessions.write();
        if sessions.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }

        let session = Session::new(id.clone(), &options);
        sessions.insert(id.clone(), session.clone());
        drop(sessions);

        TraceEvent::SessionCreated {
            session_id: id.clone(),
        }
        .emit();

        Ok(session)
    }

    fn get(&self, id: &str, cancel: &CancelToken) -> Result<Session> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let sessions = self.sessions.read();
        let session = sessions
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;

        if session.is_expired(Utc::now()) {
            TraceEvent::SessionExpired {
                session_id: id.to_owned(),
            }
            .emit();
            return Err(StoreError::Expired(id.to_owned()));
        }

        Ok(session.clone())
    }

    fn save(&self, session: &Session, cancel: &CancelToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let mut sessions = self.sessions.write();
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    fn delete(&self, id: &str, cancel: &CancelToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let mut sessions = self.sessions.write();
        sessions
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))
    }

    fn exists(&self, id: &str, cancel: &CancelToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }
        self.sessions
            .read()
            .get(id)
            .map(|s| !s.is_expired(Utc::now()))
            .unwrap_or(false)
    }

    fn list(&self, filter: &SessionFilter, cancel: &CancelToken) -> Vec<String> {
        if cancel.is_cancelled() {
            return Vec::new();
        }
        let now = Utc::now();
        self.sessions
            .read()
            .values()
            .filter(|s| !s.is_expired(now) && filter.matches(s))
            .map(|s| s.id.clone())
            .collect()
    }

    fn get_history(&self, id: &str, n: usize, cancel: &CancelToken) -> Result<Vec<ac_domain::SessionEntry>> {
        let session = self.get(id, cancel)?;
        Ok(session.history(n).to_vec())
    }

    fn touch(&self, id: &str, cancel: &CancelToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let mut sessions = self.sessions.write();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        if session.is_expired(Utc::now()) {
            return Err(StoreError::Expired(id.to_owned()));
        }
        session.touch();
        Ok(())
    }
}

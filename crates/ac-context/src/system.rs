use ac_sessions::Session;

use crate::{ContextProvider, Fragment};

/// Emits one static `system` fragment — the agent's standing instructions.
pub struct SystemProvider {
    text: String,
}

impl SystemProvider {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ContextProvider for SystemProvider {
    fn type_tag(&self) -> &str {
        "system"
    }

    fn provide(&self, _session: &Session) -> Vec<Fragment> {
        vec![Fragment::new("system", self.text.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_domain::CancelToken;
    use ac_sessions::{CreateOptions, InMemorySessionStore, SessionStore};

    #[test]
    fn emits_single_system_fragment() {
        let store = InMemorySessionStore::new();
        let session = store.create(CreateOptions::default(), &CancelToken::new()).unwrap();
        let provider = SystemProvider::new("be helpful");
        let fragments = provider.provide(&session);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].type_tag, "system");
        assert_eq!(fragments[0].content, "be helpful");
    }
}

//! Pluggable context providers.
//!
//! A provider is a pure function of a session snapshot producing typed
//! `Fragment`s; the prompt template (`ac-prompt`) pulls fragments by type tag to
//! build the messages handed to the LLM.

pub mod fragment;
pub mod history;
pub mod system;
pub mod thinking;

pub use fragment::Fragment;
pub use history::HistoryProvider;
pub use system::SystemProvider;
pub use thinking::ThinkingProvider;

use ac_sessions::Session;

/// A producer of context fragments. Implementations must not mutate the session;
/// they only read it.
pub trait ContextProvider: Send + Sync {
    /// The fragment type tag this provider emits (used by the template's
    /// `{{type}}` variable to select providers).
    fn type_tag(&self) -> &str;

    /// An optional name, used by the template's `{{type:name}}` variable to
    /// restrict selection to a single named provider.
    fn name(&self) -> Option<&str> {
        None
    }

    fn provide(&self, session: &Session) -> Vec<Fragment>;
}

/// Invoke every provider against the session snapshot and concatenate their
/// fragments in provider order, stamping `metadata["provider_name"]` on each
/// fragment whose provider exposes a `name()` so the template's `{{type:name}}`
/// variable can select it later without re-consulting the provider list.
pub fn gather(providers: &[std::sync::Arc<dyn ContextProvider>], session: &Session) -> Vec<Fragment> {
    let mut out = Vec::new();
    for provider in providers {
        let mut fragments = provider.provide(session);
        if let Some(name) = provider.name() {
            for fragment in &mut fragments {
                fragment
                    .metadata
                    .entry("provider_name".to_string())
                    .or_insert_with(|| serde_json::json!(name));
            }
        }
        out.extend(fragments);
    }
    out
}

use std::collections::HashMap;

/// A typed piece of context produced by a provider. Ephemeral — fragments exist
/// only during prompt assembly and are never persisted.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub type_tag: String,
    pub content: String,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Fragment {
    pub fn new(type_tag: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

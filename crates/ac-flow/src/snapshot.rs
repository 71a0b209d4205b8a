use std::collections::HashMap;

use ac_domain::tool::Message;

/// The view a condition evaluates against: the rendered-so-far message list plus
/// a small data map of convenience fields (`user_input`, `message_count`, and
/// anything the caller seeded the session with).
#[derive(Debug, Clone)]
pub struct FlowSnapshot {
    pub messages: Vec<Message>,
    pub data: HashMap<String, serde_json::Value>,
}

impl FlowSnapshot {
    pub fn new(messages: Vec<Message>, user_input: &str) -> Self {
        let mut data = HashMap::new();
        data.insert("user_input".to_string(), serde_json::json!(user_input));
        data.insert("message_count".to_string(), serde_json::json!(messages.len()));
        Self { messages, data }
    }

    pub fn user_input(&self) -> &str {
        self.data
            .get("user_input")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }

    pub fn message_count(&self) -> usize {
        self.data
            .get("message_count")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as usize
    }
}

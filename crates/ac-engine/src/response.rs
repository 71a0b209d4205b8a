use std::collections::HashMap;

use ac_llm::Usage;
use ac_sessions::Session;

/// Usage totals for one turn.
#[derive(Debug, Clone, Default)]
pub struct TurnUsage {
    pub llm_tokens: Usage,
    pub tool_calls: usize,
    pub session_writes: usize,
}

/// Output of `Engine::execute`.
#[derive(Debug, Clone)]
pub struct Response {
    pub output: String,
    pub session_id: String,
    pub session: Session,
    pub metadata: HashMap<String, serde_json::Value>,
    pub usage: TurnUsage,
}

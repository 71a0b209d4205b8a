use ac_domain::tool::{Message, ToolDefinition};
use ac_domain::CancelToken;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::settings::Settings;

/// Token usage reported by a completed LLM call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt: u32,
    pub completion: u32,
    pub total: u32,
}

impl Usage {
    pub fn add(&mut self, other: Usage) {
        self.prompt += other.prompt;
        self.completion += other.completion;
        self.total += other.total;
    }
}

/// A single completion request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub model_id: String,
    pub settings: Settings,
    pub tools: Vec<ToolDefinition>,
}

/// A single completion response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub message: Message,
    pub usage: Usage,
}

/// The boundary the engine calls through for every model invocation. One
/// operation, non-streaming: the engine's loop is defined in terms of complete
/// request/response pairs, not token deltas.
///
/// `complete` takes the turn's `CancelToken` so an implementation backed by a
/// real HTTP transport can abort an in-flight call instead of only checking
/// cancellation before/after it; a cancelled call must return `Error::Cancelled`,
/// not a generic `Provider`/`Timeout` failure.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: ChatRequest, cancel: &CancelToken) -> Result<ChatResponse>;
}

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("max iterations exceeded ({0})")]
    MaxIterationsExceeded(usize),
    #[error("llm call failed: {0}")]
    LlmCallFailed(String),
    #[error("cancelled")]
    Cancelled,
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

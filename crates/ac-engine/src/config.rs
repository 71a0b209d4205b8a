use std::time::Duration;

use serde::{Deserialize, Serialize};

fn d_max_iterations() -> usize {
    5
}
fn d_tool_timeout() -> Duration {
    Duration::from_secs(30)
}
fn d_session_ttl() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}
fn d_history_limit() -> usize {
    0
}
fn d_mirror_tool_exchanges() -> bool {
    false
}

/// Assembles the engine-level default `Settings` from `EngineConfig`'s
/// enumerated sampling fields. A flow rule's `Action::OverrideModelSettings`
/// replaces this wholesale for the turn; it does not merge field-by-field.
fn default_settings(config: &EngineConfig) -> ac_llm::Settings {
    ac_llm::Settings {
        temperature: config.default_temperature,
        max_tokens: config.default_max_tokens,
        top_p: config.default_top_p,
        frequency_penalty: config.default_frequency_penalty,
        presence_penalty: config.default_presence_penalty,
        ..Default::default()
    }
}

/// Validated, immutable-after-build configuration for an `Engine`. Assembled and
/// range-checked by `EngineBuilder`; never mutated once the engine is running.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "d_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "d_tool_timeout")]
    pub tool_timeout: Duration,
    /// Zero means the session never expires.
    #[serde(default = "d_session_ttl")]
    pub session_ttl: Duration,
    /// Zero means no limit — every entry is included.
    #[serde(default = "d_history_limit")]
    pub history_limit: usize,
    pub model: String,
    #[serde(default)]
    pub instructions: String,
    /// Whether intra-turn tool-call/tool-result pairs are mirrored into session
    /// history alongside the final user/assistant pair. Off by default.
    #[serde(default = "d_mirror_tool_exchanges")]
    pub mirror_tool_exchanges: bool,
    /// Engine-level default sampling parameters, used whenever a turn has no
    /// `Action::OverrideModelSettings` in effect. Each is range-checked by
    /// `validate_settings` at build time.
    #[serde(default)]
    pub default_temperature: Option<f32>,
    #[serde(default)]
    pub default_max_tokens: Option<u32>,
    #[serde(default)]
    pub default_top_p: Option<f32>,
    #[serde(default)]
    pub default_frequency_penalty: Option<f32>,
    #[serde(default)]
    pub default_presence_penalty: Option<f32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: d_max_iterations(),
            tool_timeout: d_tool_timeout(),
            session_ttl: d_session_ttl(),
            history_limit: d_history_limit(),
            model: String::new(),
            instructions: String::new(),
            mirror_tool_exchanges: d_mirror_tool_exchanges(),
            default_temperature: None,
            default_max_tokens: None,
            default_top_p: None,
            default_frequency_penalty: None,
            default_presence_penalty: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("max_iterations must be at least 1")]
    MaxIterationsZero,
    #[error("model must not be empty")]
    ModelEmpty,
    #[error("temperature must be within 0.0..=2.0, got {0}")]
    TemperatureOutOfRange(f32),
    #[error("top_p must be within 0.0..=1.0, got {0}")]
    TopPOutOfRange(f32),
    #[error("frequency_penalty must be within -2.0..=2.0, got {0}")]
    FrequencyPenaltyOutOfRange(f32),
    #[error("presence_penalty must be within -2.0..=2.0, got {0}")]
    PresencePenaltyOutOfRange(f32),
    #[error("max_tokens must be greater than 0")]
    MaxTokensZero,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::MaxIterationsZero);
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::ModelEmpty);
        }
        validate_settings(&default_settings(self))?;
        Ok(())
    }

    /// The engine-level default `Settings`, assembled from this config's
    /// enumerated sampling fields.
    pub fn default_settings(&self) -> ac_llm::Settings {
        default_settings(self)
    }
}

/// Validates a `Settings` against the enumerated ranges (§6). Called by the
/// builder whenever default per-turn settings are supplied.
pub fn validate_settings(settings: &ac_llm::Settings) -> Result<(), ConfigError> {
    if let Some(t) = settings.temperature {
        if !(0.0..=2.0).contains(&t) {
            return Err(ConfigError::TemperatureOutOfRange(t));
        }
    }
    if let Some(p) = settings.top_p {
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::TopPOutOfRange(p));
        }
    }
    if let Some(p) = settings.frequency_penalty {
        if !(-2.0..=2.0).contains(&p) {
            return Err(ConfigError::FrequencyPenaltyOutOfRange(p));
        }
    }
    if let Some(p) = settings.presence_penalty {
        if !(-2.0..=2.0).contains(&p) {
            return Err(ConfigError::PresencePenaltyOutOfRange(p));
        }
    }
    if let Some(0) = settings.max_tokens {
        return Err(ConfigError::MaxTokensZero);
    }
    Ok(())
}

use ac_llm::Settings;
use serde::{Deserialize, Serialize};

/// An action a matched flow rule performs. `DirectResponse` and `AiPrompt` are
/// terminal for rule evaluation (they set the stop flag); the remaining actions
/// are modifiers that compose across multiple matched rules before the turn
/// either falls through to the default LLM call or hits a terminal rule.
///
/// Unlike `Condition`, no variant closes over a closure, so `Action` derives
/// `Serialize`/`Deserialize` directly — a registered name (the variant tag)
/// plus its parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum Action {
    /// Return a literal response immediately; `{{key}}` placeholders are
    /// substituted from the snapshot's data map.
    DirectResponse { template: String },
    /// Set the effective system instructions for this turn; optionally register a
    /// fallback response used if the subsequent LLM call fails.
    AiPrompt {
        system_prefix: String,
        fallback: Option<String>,
    },
    AppendSystemMessage(String),
    ClearHistory,
    /// Tool names to move to the front of the definitions list for this turn.
    RecommendTools(Vec<String>),
    OverrideModelSettings(Settings),
}

impl Action {
    /// Whether a match on this action stops further rule evaluation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Action::DirectResponse { .. } | Action::AiPrompt { .. })
    }
}

/// Accumulated effect of evaluating a flow rule set against one snapshot.
#[derive(Debug, Clone, Default)]
pub struct ActionOutcome {
    pub stop: bool,
    pub direct_response: Option<String>,
    pub system_prefix: Option<String>,
    pub fallback: Option<String>,
    pub appended_system_messages: Vec<String>,
    pub clear_history: bool,
    pub recommended_tools: Vec<String>,
    pub settings_override: Option<Settings>,
    /// Name of the last rule that matched and stopped evaluation, if any.
    pub triggered_rule: Option<String>,
}

fn substitute(template: &str, data: &std::collections::HashMap<String, serde_json::Value>) -> String {
    let mut out = template.to_string();
    for (key, value) in data {
        let placeholder = format!("{{{{{key}}}}}");
        let rendered = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        out = out.replace(&placeholder, &rendered);
    }
    out
}

impl ActionOutcome {
    pub fn apply(&mut self, rule_name: &str, action: &Action, snapshot: &crate::FlowSnapshot) {
        match action {
            Action::DirectResponse { template } => {
                self.direct_response = Some(substitute(template, &snapshot.data));
            }
            Action::AiPrompt { system_prefix, fallback } => {
                self.system_prefix = Some(system_prefix.clone());
                self.fallback = fallback.clone();
            }
            Action::AppendSystemMessage(text) => {
                self.appended_system_messages.push(text.clone());
            }
            Action::ClearHistory => {
                self.clear_history = true;
            }
            Action::RecommendTools(names) => {
                self.recommended_tools = names.clone();
            }
            Action::OverrideModelSettings(settings) => {
                self.settings_override = Some(settings.clone());
            }
        }
        if action.is_terminal() {
            self.stop = true;
            self.triggered_rule = Some(rule_name.to_string());
        }
    }
}

//! Pre-LLM flow-rule interception: ordered (condition → action) pairs that can
//! short-circuit a turn, rewrite its instructions, or bias tool selection.

pub mod action;
pub mod condition;
pub mod engine;
pub mod snapshot;

pub use action::{Action, ActionOutcome};
pub use condition::{Condition, ConditionDescriptor};
pub use engine::FlowEngine;
pub use snapshot::FlowSnapshot;

use serde::{Deserialize, Serialize};

/// A single ordered rule. Rules are evaluated by descending `priority`;
/// evaluation stops at the first enabled rule whose condition matches and whose
/// action sets the stop flag.
#[derive(Debug, Clone)]
pub struct FlowRule {
    pub name: String,
    pub condition: Condition,
    pub action: Action,
    pub priority: i32,
    pub enabled: bool,
}

impl FlowRule {
    pub fn new(name: impl Into<String>, condition: Condition, action: Action) -> Self {
        Self {
            name: name.into(),
            condition,
            action,
            priority: 0,
            enabled: true,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// A serializable projection of a `FlowRule`: its name, priority, enabled flag,
/// and the condition/action as a registered name plus recoverable parameters.
/// `Condition::Custom` has no serializable form and is represented by
/// `ConditionDescriptor::Custom`, a documented placeholder that carries no data
/// — a rule built from the descriptor alone cannot reconstruct the original
/// closure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowRuleDescriptor {
    pub name: String,
    pub condition: ConditionDescriptor,
    pub action: Action,
    pub priority: i32,
    pub enabled: bool,
}

impl From<&FlowRule> for FlowRuleDescriptor {
    fn from(rule: &FlowRule) -> Self {
        Self {
            name: rule.name.clone(),
            condition: ConditionDescriptor::from(&rule.condition),
            action: rule.action.clone(),
            priority: rule.priority,
            enabled: rule.enabled,
        }
    }
}

#[cfg(test)]
mod descriptor_tests {
    use super::*;

    #[test]
    fn descriptor_serializes_condition_and_action() {
        let rule = FlowRule::new(
            "greeting",
            Condition::UserInputContains("ping".into()),
            Action::DirectResponse {
                template: "pong".into(),
            },
        )
        .with_priority(5);

        let descriptor = FlowRuleDescriptor::from(&rule);
        let json = serde_json::to_string(&descriptor).unwrap();
        assert!(json.contains("\"name\":\"greeting\""));
        assert!(json.contains("\"priority\":5"));
        assert!(json.contains("user_input_contains"));
        assert!(json.contains("direct_response"));
    }
}

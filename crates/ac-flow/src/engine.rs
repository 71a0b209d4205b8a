use ac_domain::trace::TraceEvent;

use crate::action::ActionOutcome;
use crate::snapshot::FlowSnapshot;
use crate::FlowRule;

/// Evaluates an ordered rule set against one snapshot, applying every matching
/// rule's action in descending-priority order until a terminal action stops
/// evaluation.
pub struct FlowEngine;

impl FlowEngine {
    pub fn evaluate(rules: &[FlowRule], snapshot: &FlowSnapshot, session_id: &str) -> ActionOutcome {
        let mut ordered: Vec<&FlowRule> = rules.iter().filter(|r| r.enabled).collect();
        ordered.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut outcome = ActionOutcome::default();
        for rule in ordered {
            if !rule.condition.evaluate(snapshot) {
                continue;
            }
            TraceEvent::FlowRuleTriggered {
                rule_name: rule.name.clone(),
                session_id: session_id.to_string(),
            }
            .emit();
            outcome.apply(&rule.name, &rule.action, snapshot);
            if outcome.stop {
                break;
            }
        }
        outcome
    }
}

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::snapshot::FlowSnapshot;

/// A condition, identified by its enum variant name (the "registered name" the
/// spec's serialization note refers to). Closed over built-ins plus a `Custom`
/// escape hatch for programmatic registration that can't round-trip through
/// serde.
#[derive(Clone)]
pub enum Condition {
    Always,
    MessageCountEquals(usize),
    MessageCountAtLeast(usize),
    UserInputContains(String),
    /// Matches if the user input contains any of the given substrings
    /// (case-sensitive). A lightweight stand-in for regex matching — see
    /// `Condition::Custom` if real regex semantics are needed.
    UserInputMatches(Vec<String>),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
    Custom(Arc<dyn Fn(&FlowSnapshot) -> bool + Send + Sync>),
}

impl std::fmt::Debug for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Always => write!(f, "Always"),
            Condition::MessageCountEquals(n) => write!(f, "MessageCountEquals({n})"),
            Condition::MessageCountAtLeast(n) => write!(f, "MessageCountAtLeast({n})"),
            Condition::UserInputContains(s) => write!(f, "UserInputContains({s:?})"),
            Condition::UserInputMatches(v) => write!(f, "UserInputMatches({v:?})"),
            Condition::And(cs) => write!(f, "And({cs:?})"),
            Condition::Or(cs) => write!(f, "Or({cs:?})"),
            Condition::Not(c) => write!(f, "Not({c:?})"),
            Condition::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl Condition {
    pub fn evaluate(&self, snapshot: &FlowSnapshot) -> bool {
        match self {
            Condition::Always => true,
            Condition::MessageCountEquals(n) => snapshot.message_count() == *n,
            Condition::MessageCountAtLeast(n) => snapshot.message_count() >= *n,
            Condition::UserInputContains(needle) => snapshot.user_input().contains(needle.as_str()),
            Condition::UserInputMatches(needles) => {
                needles.iter().any(|n| snapshot.user_input().contains(n.as_str()))
            }
            Condition::And(conditions) => conditions.iter().all(|c| c.evaluate(snapshot)),
            Condition::Or(conditions) => conditions.iter().any(|c| c.evaluate(snapshot)),
            Condition::Not(inner) => !inner.evaluate(snapshot),
            Condition::Custom(f) => f(snapshot),
        }
    }

    pub fn and(self, other: Condition) -> Condition {
        Condition::And(vec![self, other])
    }

    pub fn or(self, other: Condition) -> Condition {
        Condition::Or(vec![self, other])
    }

    pub fn not(self) -> Condition {
        Condition::Not(Box::new(self))
    }
}

/// Serializable projection of a `Condition`. Every built-in variant round-trips;
/// `Condition::Custom` has no serializable form (it closes over an arbitrary
/// function pointer) and maps to the `custom` placeholder, which carries no data
/// and cannot be converted back into a working condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionDescriptor {
    Always,
    MessageCountEquals { count: usize },
    MessageCountAtLeast { count: usize },
    UserInputContains { needle: String },
    UserInputMatches { needles: Vec<String> },
    And { conditions: Vec<ConditionDescriptor> },
    Or { conditions: Vec<ConditionDescriptor> },
    Not { condition: Box<ConditionDescriptor> },
    Custom,
}

impl From<&Condition> for ConditionDescriptor {
    fn from(condition: &Condition) -> Self {
        match condition {
            Condition::Always => ConditionDescriptor::Always,
            Condition::MessageCountEquals(n) => ConditionDescriptor::MessageCountEquals { count: *n },
            Condition::MessageCountAtLeast(n) => ConditionDescriptor::MessageCountAtLeast { count: *n },
            Condition::UserInputContains(s) => ConditionDescriptor::UserInputContains { needle: s.clone() },
            Condition::UserInputMatches(v) => ConditionDescriptor::UserInputMatches { needles: v.clone() },
            Condition::And(cs) => ConditionDescriptor::And {
                conditions: cs.iter().map(ConditionDescriptor::from).collect(),
            },
            Condition::Or(cs) => ConditionDescriptor::Or {
                conditions: cs.iter().map(ConditionDescriptor::from).collect(),
            },
            Condition::Not(c) => ConditionDescriptor::Not {
                condition: Box::new(ConditionDescriptor::from(c.as_ref())),
            },
            Condition::Custom(_) => ConditionDescriptor::Custom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_domain::tool::Message;

    fn snapshot(input: &str) -> FlowSnapshot {
        FlowSnapshot::new(vec![Message::user(input)], input)
    }

    #[test]
    fn always_matches() {
        assert!(Condition::Always.evaluate(&snapshot("hi")));
    }

    #[test]
    fn user_input_contains() {
        let cond = Condition::UserInputContains("help".into());
        assert!(cond.evaluate(&snapshot("I need help")));
        assert!(!cond.evaluate(&snapshot("goodbye")));
    }

    #[test]
    fn message_count_equals_and_at_least() {
        let snap = snapshot("hi");
        assert!(Condition::MessageCountEquals(1).evaluate(&snap));
        assert!(Condition::MessageCountAtLeast(1).evaluate(&snap));
        assert!(!Condition::MessageCountAtLeast(2).evaluate(&snap));
    }

    #[test]
    fn and_or_not_combinators() {
        let snap = snapshot("please help me");
        let a = Condition::UserInputContains("help".into());
        let b = Condition::UserInputContains("please".into());
        assert!(a.clone().and(b.clone()).evaluate(&snap));
        assert!(a.clone().or(Condition::UserInputContains("xyz".into())).evaluate(&snap));
        assert!(!a.not().evaluate(&snap));
    }

    #[test]
    fn custom_condition_runs_arbitrary_closure() {
        let cond = Condition::Custom(Arc::new(|s: &FlowSnapshot| s.user_input().len() > 3));
        assert!(cond.evaluate(&snapshot("hello")));
        assert!(!cond.evaluate(&snapshot("hi")));
    }

    #[test]
    fn user_input_matches_any_of_set() {
        let cond = Condition::UserInputMatches(vec!["foo".into(), "bar".into()]);
        assert!(cond.evaluate(&snapshot("contains bar here")));
        assert!(!cond.evaluate(&snapshot("contains baz here")));
    }

    #[test]
    fn descriptor_serializes_nested_conditions() {
        let cond = Condition::UserInputContains("help".into())
            .and(Condition::MessageCountAtLeast(2))
            .not();
        let descriptor = ConditionDescriptor::from(&cond);
        let json = serde_json::to_string(&descriptor).unwrap();
        assert!(json.contains("\"type\":\"not\""));
        assert!(json.contains("\"type\":\"and\""));
    }

    #[test]
    fn custom_condition_descriptor_carries_no_data() {
        let cond = Condition::Custom(Arc::new(|_: &FlowSnapshot| true));
        let descriptor = ConditionDescriptor::from(&cond);
        assert!(matches!(descriptor, ConditionDescriptor::Custom));
    }
}

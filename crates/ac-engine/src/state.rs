/// The phases one turn passes through. `Engine::execute` advances through these
/// explicitly rather than nesting conditionals — each phase corresponds to one
/// step in SPEC_FULL.md §4.7.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnState {
    Validated,
    SessionResolved,
    ContextGathered,
    FlowShortCircuited,
    LlmCalled { iteration: usize },
    ToolDispatching { iteration: usize },
    Terminal,
    Persisted,
    Returned,
}

impl TurnState {
    pub fn label(&self) -> &'static str {
        match self {
            TurnState::Validated => "validated",
            TurnState::SessionResolved => "session_resolved",
            TurnState::ContextGathered => "context_gathered",
            TurnState::FlowShortCircuited => "flow_short_circuited",
            TurnState::LlmCalled { .. } => "llm_called",
            TurnState::ToolDispatching { .. } => "tool_dispatching",
            TurnState::Terminal => "terminal",
            TurnState::Persisted => "persisted",
            TurnState::Returned => "returned",
        }
    }
}

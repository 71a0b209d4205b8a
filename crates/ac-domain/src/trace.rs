use serde::Serialize;

/// Structured, externally-observable lifecycle events emitted by the engine and
/// its collaborators. Always serialized to JSON and carried as a single
/// `tracing::info!` field so a log pipeline can index on `event` without parsing
/// free text.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    TurnStarted {
        session_id: String,
        run_id: String,
    },
    TurnCompleted {
        session_id: String,
        run_id: String,
        iterations: usize,
        tools_called: usize,
        duration_ms: u64,
    },
    SessionCreated {
        session_id: String,
    },
    SessionExpired {
        session_id: String,
    },
    FlowRuleTriggered {
        rule_name: String,
        session_id: String,
    },
    ToolDispatched {
        tool_name: String,
        call_id: String,
        success: bool,
        duration_ms: u64,
    },
    ToolTimedOut {
        tool_name: String,
        call_id: String,
        timeout_ms: u64,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "engine_event");
    }
}

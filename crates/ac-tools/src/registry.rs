use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ac_domain::tool::{ToolCall, ToolDefinition};
use ac_domain::CancelToken;

use crate::result::ToolResult;
use crate::tool::{Tool, ToolContext};

/// Name → tool mapping. Dispatch never panics and never propagates a tool's
/// internal error as an engine error: every outcome becomes a `ToolResult`.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.schema(),
            })
            .collect()
    }

    /// `definitions()`, with any tool named in `recommended` stably moved to the
    /// front — used by the flow-rule "recommend tools" action (§4.5) to bias the
    /// model toward a subset for one turn without hiding the rest.
    pub fn definitions_with_priority(&self, recommended: &[String]) -> Vec<ToolDefinition> {
        let mut defs = self.definitions();
        defs.sort_by_key(|d| {
            recommended
                .iter()
                .position(|name| name == &d.name)
                .unwrap_or(usize::MAX)
        });
        defs
    }

    /// Dispatch one tool call under `timeout`, bounded by a fresh child of
    /// `cancel`. Unknown names, argument parse failures, timeouts and tool errors
    /// all yield a populated `ToolResult` rather than propagating.
    pub async fn dispatch(&self, call: &ToolCall, timeout: Duration, cancel: CancelToken) -> ToolResult {
        let Some(tool) = self.tools.get(&call.tool_name) else {
            return ToolResult::err(
                call.id.clone(),
                call.tool_name.clone(),
                format!("unknown tool: {}", call.tool_name),
            );
        };

        let args = match serde_json::from_str::<serde_json::Value>(&call.arguments) {
            Ok(v) => v,
            Err(e) => {
                return ToolResult::err(
                    call.id.clone(),
                    call.tool_name.clone(),
                    format!("invalid arguments: {e}"),
                )
            }
        };

        let ctx = ToolContext { cancel };
        match tokio::time::timeout(timeout, tool.execute(&ctx, args)).await {
            Ok(Ok(value)) => ToolResult::ok(call.id.clone(), call.tool_name.clone(), value),
            Ok(Err(e)) => ToolResult::err(call.id.clone(), call.tool_name.clone(), e.to_string()),
            Err(_) => ToolResult::err(
                call.id.clone(),
                call.tool_name.clone(),
                format!("tool '{}' timed out after {:?}", call.tool_name, timeout),
            ),
        }
    }
}

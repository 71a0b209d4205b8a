use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use ac_context::ContextProvider;
use ac_domain::tool::Message;
use ac_domain::trace::TraceEvent;
use ac_domain::{CancelToken, SessionEntry};
use ac_flow::{FlowEngine, FlowRule, FlowSnapshot};
use ac_llm::{ChatRequest, LlmClient};
use ac_sessions::{SessionStore, StoreError};
use ac_tools::ToolRegistry;

use crate::config::{validate_settings, EngineConfig};
use crate::error::EngineError;
use crate::request::Request;
use crate::response::{Response, TurnUsage};
use crate::state::TurnState;

/// The agent execution engine. Every field is read-only once built; the only
/// mutable shared resource is the session store.
pub struct Engine {
    pub(crate) llm_client: Arc<dyn LlmClient>,
    pub(crate) tool_registry: Arc<ToolRegistry>,
    pub(crate) providers: Vec<Arc<dyn ContextProvider>>,
    pub(crate) session_store: Arc<dyn SessionStore>,
    pub(crate) flow_rules: Vec<FlowRule>,
    pub(crate) template: ac_prompt::Template,
    pub(crate) config: EngineConfig,
    pub(crate) create_options: ac_sessions::CreateOptions,
}

impl Engine {
    pub async fn execute(&self, cancel: &CancelToken, request: Request) -> Result<Response, EngineError> {
        let started_at = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();

        // Step A — input guard.
        if request.input.trim().is_empty() {
            return Err(EngineError::InvalidInput("input must not be empty".into()));
        }
        let mut state = TurnState::Validated;
        tracing::debug!(phase = state.label(), "turn advanced");

        // Step B — session resolution.
        let mut session = match &request.session_id {
            None => {
                let mut options = self.create_options.clone();
                let now = chrono::Utc::now();
                options
                    .initial_metadata
                    .insert("created_by".into(), serde_json::json!("ac-engine"));
                let mut session = self
                    .session_store
                    .create(options, cancel)
                    .map_err(|e| match e {
                        StoreError::Cancelled => EngineError::Cancelled,
                        other => EngineError::SessionNotFound(other.to_string()),
                    })?;
                session.set_quiet(
                    "initial_input_length",
                    serde_json::json!(request.input.chars().count()),
                );
                session.set_quiet("session_start_time", serde_json::json!(now.to_rfc3339()));
                session
            }
            Some(id) => self.session_store.get(id, cancel).map_err(|e| match e {
                StoreError::NotFound(id) | StoreError::Expired(id) => EngineError::SessionNotFound(id),
                StoreError::Cancelled => EngineError::Cancelled,
                other => EngineError::SessionNotFound(other.to_string()),
            })?,
        };
        state = TurnState::SessionResolved;
        tracing::debug!(phase = state.label(), "turn advanced");
        TraceEvent::TurnStarted {
            session_id: session.id.clone(),
            run_id: run_id.clone(),
        }
        .emit();

        // Step C — gather context.
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let mut fragments = ac_context::gather(&self.providers, &session);
        if self.config.history_limit > 0 {
            let history_provider = ac_context::HistoryProvider::new(self.config.history_limit);
            fragments.extend(history_provider.provide(&session));
        }
        state = TurnState::ContextGathered;
        tracing::debug!(phase = state.label(), "turn advanced");

        // Step D — flow rules.
        let initial_messages = ac_prompt::render(&self.template, &fragments, &request.input);
        let snapshot = FlowSnapshot::new(initial_messages.clone(), &request.input);
        let outcome = FlowEngine::evaluate(&self.flow_rules, &snapshot, &session.id);

        if let Some(direct) = &outcome.direct_response {
            state = TurnState::FlowShortCircuited;
            tracing::debug!(phase = state.label(), "turn advanced");

            session.add_entries([
                SessionEntry::message(Message::user(request.input.clone())),
                SessionEntry::message(Message::assistant(direct.clone())),
            ]);
            session.set("last_interaction", serde_json::json!(chrono::Utc::now().to_rfc3339()));
            session.set("total_messages", serde_json::json!(session.entries().len()));
            let session_writes = self.session_store.save(&session, cancel).map(|_| 1).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to persist flow-short-circuited session");
                0
            });

            let mut metadata = HashMap::new();
            metadata.insert("total_iterations".into(), serde_json::json!(0));
            metadata.insert("tools_called".into(), serde_json::json!(0));
            metadata.insert(
                "completion_time".into(),
                serde_json::json!(started_at.elapsed().as_millis() as u64),
            );

            TraceEvent::TurnCompleted {
                session_id: session.id.clone(),
                run_id,
                iterations: 0,
                tools_called: 0,
                duration_ms: started_at.elapsed().as_millis() as u64,
            }
            .emit();

            return Ok(Response {
                output: direct.clone(),
                session_id: session.id.clone(),
                session,
                metadata,
                usage: TurnUsage {
                    session_writes,
                    ..Default::default()
                },
            });
        }

        let mut conversation_messages = if outcome.clear_history {
            let filtered: Vec<_> = fragments.iter().filter(|f| f.type_tag != "history").cloned().collect();
            ac_prompt::render(&self.template, &filtered, &request.input)
        } else {
            initial_messages
        };

        if let Some(prefix) = &outcome.system_prefix {
            conversation_messages.insert(0, Message::system(prefix.clone()));
        }
        for extra in &outcome.appended_system_messages {
            conversation_messages.push(Message::system(extra.clone()));
        }

        let tool_defs = if outcome.recommended_tools.is_empty() {
            self.tool_registry.definitions()
        } else {
            self.tool_registry.definitions_with_priority(&outcome.recommended_tools)
        };

        let settings = match &outcome.settings_override {
            Some(override_settings) => {
                validate_settings(override_settings)?;
                override_settings.clone()
            }
            None => self.config.default_settings(),
        };

        // Step E — iteration loop.
        let mut usage = TurnUsage::default();
        let mut final_output: Option<String> = None;
        let mut iterations_used = 0usize;
        let mut mirrored: Vec<SessionEntry> = Vec::new();

        for i in 0..self.config.max_iterations {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            iterations_used = i + 1;
            state = TurnState::LlmCalled { iteration: iterations_used };
            tracing::debug!(phase = state.label(), iteration = iterations_used, "turn advanced");

            let chat_request = ChatRequest {
                messages: conversation_messages.clone(),
                model_id: self.config.model.clone(),
                settings: settings.clone(),
                tools: tool_defs.clone(),
            };

            let chat_response = match self.llm_client.complete(chat_request, cancel).await {
                Ok(r) => r,
                Err(ac_llm::Error::Cancelled) => {
                    return Err(EngineError::Cancelled);
                }
                Err(e) => {
                    if let Some(fallback) = &outcome.fallback {
                        tracing::warn!(error = %e, "llm call failed, using registered fallback");
                        final_output = Some(fallback.clone());
                        break;
                    }
                    return Err(EngineError::LlmCallFailed(e.to_string()));
                }
            };

            usage.llm_tokens.add(chat_response.usage);

            if chat_response.message.has_tool_calls() {
                let text = if chat_response.message.content.is_empty() {
                    " ".to_string()
                } else {
                    chat_response.message.content.extract_all_text()
                };
                state = TurnState::ToolDispatching { iteration: iterations_used };
                tracing::debug!(phase = state.label(), iteration = iterations_used, "turn advanced");

                let tool_calls = chat_response.message.tool_calls.clone();
                conversation_messages.push(Message::assistant_with_tool_calls(text, tool_calls.clone()));

                if self.config.mirror_tool_exchanges {
                    for call in &tool_calls {
                        let params = serde_json::from_str(&call.arguments).unwrap_or(serde_json::Value::Null);
                        mirrored.push(SessionEntry::tool_call(call.tool_name.clone(), params));
                    }
                }

                let dispatches = tool_calls.iter().map(|call| {
                    let registry = Arc::clone(&self.tool_registry);
                    let timeout = self.config.tool_timeout;
                    let call_cancel = cancel.clone();
                    async move {
                        let start = Instant::now();
                        let result = registry.dispatch(call, timeout, call_cancel).await;
                        (result, start.elapsed().as_millis() as u64)
                    }
                });
                let dispatched = futures_util::future::join_all(dispatches).await;
                usage.tool_calls += dispatched.len();

                for (result, duration_ms) in &dispatched {
                    if result.is_ok() {
                        TraceEvent::ToolDispatched {
                            tool_name: result.tool_name.clone(),
                            call_id: result.call_id.clone(),
                            success: true,
                            duration_ms: *duration_ms,
                        }
                        .emit();
                    } else if result.error.as_deref().is_some_and(|e| e.contains("timed out")) {
                        TraceEvent::ToolTimedOut {
                            tool_name: result.tool_name.clone(),
                            call_id: result.call_id.clone(),
                            timeout_ms: self.config.tool_timeout.as_millis() as u64,
                        }
                        .emit();
                    } else {
                        TraceEvent::ToolDispatched {
                            tool_name: result.tool_name.clone(),
                            call_id: result.call_id.clone(),
                            success: false,
                            duration_ms: *duration_ms,
                        }
                        .emit();
                    }

                    let content = if result.is_ok() {
                        format!(
                            "Tool '{}' executed successfully. Result: {}",
                            result.tool_name,
                            result.value.clone().unwrap_or(serde_json::Value::Null)
                        )
                    } else {
                        format!(
                            "Tool '{}' execution failed: {}",
                            result.tool_name,
                            result.error.clone().unwrap_or_default()
                        )
                    };
                    conversation_messages.push(Message::tool_result(
                        result.call_id.clone(),
                        result.tool_name.clone(),
                        content.clone(),
                    ));

                    if self.config.mirror_tool_exchanges {
                        mirrored.push(SessionEntry::tool_result(
                            result.tool_name.clone(),
                            result.value.clone(),
                            result.error.clone(),
                        ));
                    }
                }
                continue;
            } else {
                final_output = Some(chat_response.message.content.extract_all_text());
                conversation_messages.push(chat_response.message);
                break;
            }
        }

        // Step F — completion handling.
        let Some(output) = final_output else {
            return Err(EngineError::MaxIterationsExceeded(self.config.max_iterations));
        };
        state = TurnState::Terminal;
        tracing::debug!(phase = state.label(), "turn advanced");

        // Step G — session persistence.
        let mut entries = mirrored;
        entries.push(SessionEntry::message(Message::user(request.input.clone())));
        entries.push(SessionEntry::message(Message::assistant(output.clone())));
        session.add_entries(entries);
        session.set("last_interaction", serde_json::json!(chrono::Utc::now().to_rfc3339()));
        session.set("total_messages", serde_json::json!(session.entries().len()));

        let session_writes = self.session_store.save(&session, cancel).map(|_| 1).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to persist session after turn");
            0
        });
        usage.session_writes = session_writes;
        state = TurnState::Persisted;
        tracing::debug!(phase = state.label(), "turn advanced");

        // Step H — return.
        let duration_ms = started_at.elapsed().as_millis() as u64;
        let mut metadata = HashMap::new();
        metadata.insert("total_iterations".into(), serde_json::json!(iterations_used));
        metadata.insert("tools_called".into(), serde_json::json!(usage.tool_calls));
        metadata.insert("completion_time".into(), serde_json::json!(duration_ms));

        TraceEvent::TurnCompleted {
            session_id: session.id.clone(),
            run_id,
            iterations: iterations_used,
            tools_called: usage.tool_calls,
            duration_ms,
        }
        .emit();

        state = TurnState::Returned;
        tracing::debug!(phase = state.label(), "turn advanced");

        Ok(Response {
            output,
            session_id: session.id.clone(),
            session,
            metadata,
            usage,
        })
    }
}

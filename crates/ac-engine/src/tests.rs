use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use ac_context::SystemProvider;
use ac_domain::tool::{Message, Role, ToolCall};
use ac_domain::CancelToken;
use ac_flow::{Action, Condition, FlowRule};
use ac_llm::{ChatRequest, ChatResponse, LlmClient, Usage};
use ac_sessions::InMemorySessionStore;
use ac_tools::{Tool, ToolContext, ToolError};

use crate::builder::EngineBuilder;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::request::Request;

struct ScriptedLlm {
    responses: Mutex<VecDeque<ChatResponse>>,
}

impl ScriptedLlm {
    fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, _request: ChatRequest, cancel: &CancelToken) -> ac_llm::Result<ChatResponse> {
        if cancel.is_cancelled() {
            return Err(ac_llm::Error::Cancelled);
        }
        self.responses
            .lock()
            .pop_front()
            .ok_or_else(|| ac_llm::Error::Provider("script exhausted".into()))
    }
}

/// An `LlmClient` whose first call cancels the shared token partway through,
/// then returns `Cancelled` — simulating a provider transport that notices a
/// cancellation mid-flight rather than only at the call boundary.
struct CancelsMidFlightLlm {
    cancel: CancelToken,
}

#[async_trait::async_trait]
impl LlmClient for CancelsMidFlightLlm {
    async fn complete(&self, _request: ChatRequest, _cancel: &CancelToken) -> ac_llm::Result<ChatResponse> {
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        self.cancel.cancel();
        Err(ac_llm::Error::Cancelled)
    }
}

fn plain_response(text: &str) -> ChatResponse {
    ChatResponse {
        message: Message::assistant(text),
        usage: Usage {
            prompt: 10,
            completion: 5,
            total: 15,
        },
    }
}

fn tool_call_response(tool_name: &str, args: &str) -> ChatResponse {
    ChatResponse {
        message: Message::assistant_with_tool_calls("", vec![ToolCall::new(tool_name, args)]),
        usage: Usage {
            prompt: 8,
            completion: 4,
            total: 12,
        },
    }
}

struct EchoTool;

#[async_trait::async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "echoes its input back"
    }
    fn schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object"})
    }
    async fn execute(&self, _ctx: &ToolContext, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        Ok(args)
    }
}

struct SlowTool;

#[async_trait::async_trait]
impl Tool for SlowTool {
    fn name(&self) -> &str {
        "slow"
    }
    fn description(&self) -> &str {
        "never finishes before the configured timeout"
    }
    fn schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object"})
    }
    async fn execute(&self, _ctx: &ToolContext, _args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        Ok(serde_json::json!("too late"))
    }
}

fn base_config() -> EngineConfig {
    EngineConfig {
        model: "test-model".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn pure_chat_turn_with_no_tool_calls() {
    let llm = Arc::new(ScriptedLlm::new(vec![plain_response("hello there")]));
    let engine = EngineBuilder::new()
        .llm_client(llm)
        .session_store(Arc::new(InMemorySessionStore::new()))
        .provider(Arc::new(SystemProvider::new("You are a helpful assistant.")))
        .template("{{system}}\n{{user_input}}")
        .config(base_config())
        .build()
        .unwrap();

    let response = engine
        .execute(&CancelToken::new(), Request::new("hi"))
        .await
        .unwrap();

    assert_eq!(response.output, "hello there");
    assert_eq!(response.usage.tool_calls, 0);
    assert_eq!(response.session.entries().len(), 2);
}

#[tokio::test]
async fn single_tool_round_trip() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        tool_call_response("echo", r#"{"value": 1}"#),
        plain_response("the tool said 1"),
    ]));
    let engine = EngineBuilder::new()
        .llm_client(llm)
        .session_store(Arc::new(InMemorySessionStore::new()))
        .tool(Arc::new(EchoTool))
        .template("{{user_input}}")
        .config(base_config())
        .build()
        .unwrap();

    let response = engine
        .execute(&CancelToken::new(), Request::new("please echo"))
        .await
        .unwrap();

    assert_eq!(response.output, "the tool said 1");
    assert_eq!(response.usage.tool_calls, 1);
}

#[tokio::test]
async fn flow_rule_short_circuits_with_zero_llm_invocations() {
    let llm = Arc::new(ScriptedLlm::new(vec![]));
    let rule = FlowRule::new(
        "greeting",
        Condition::UserInputContains("ping".into()),
        Action::DirectResponse {
            template: "pong".into(),
        },
    );
    let engine = EngineBuilder::new()
        .llm_client(llm)
        .session_store(Arc::new(InMemorySessionStore::new()))
        .flow_rule(rule)
        .template("{{user_input}}")
        .config(base_config())
        .build()
        .unwrap();

    let response = engine
        .execute(&CancelToken::new(), Request::new("ping"))
        .await
        .unwrap();

    assert_eq!(response.output, "pong");
    assert_eq!(response.metadata.get("total_iterations"), Some(&serde_json::json!(0)));
}

#[tokio::test]
async fn tool_timeout_becomes_an_error_message_and_the_turn_continues() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        tool_call_response("slow", "{}"),
        plain_response("handled the failure gracefully"),
    ]));
    let config = EngineConfig {
        tool_timeout: std::time::Duration::from_millis(1),
        ..base_config()
    };
    let engine = EngineBuilder::new()
        .llm_client(llm)
        .session_store(Arc::new(InMemorySessionStore::new()))
        .tool(Arc::new(SlowTool))
        .template("{{user_input}}")
        .config(config)
        .build()
        .unwrap();

    let response = engine
        .execute(&CancelToken::new(), Request::new("run the slow tool"))
        .await
        .unwrap();

    assert_eq!(response.output, "handled the failure gracefully");
}

#[tokio::test]
async fn iteration_exhaustion_yields_max_iterations_exceeded() {
    let llm = Arc::new(ScriptedLlm::new(vec![tool_call_response("echo", "{}")]));
    let config = EngineConfig {
        max_iterations: 1,
        ..base_config()
    };
    let engine = EngineBuilder::new()
        .llm_client(llm)
        .session_store(Arc::new(InMemorySessionStore::new()))
        .tool(Arc::new(EchoTool))
        .template("{{user_input}}")
        .config(config)
        .build()
        .unwrap();

    let result = engine.execute(&CancelToken::new(), Request::new("go")).await;
    assert!(matches!(result, Err(EngineError::MaxIterationsExceeded(1))));
}

#[tokio::test]
async fn cancelled_token_aborts_before_the_first_llm_call() {
    let llm = Arc::new(ScriptedLlm::new(vec![plain_response("should never be read")]));
    let engine = EngineBuilder::new()
        .llm_client(llm)
        .session_store(Arc::new(InMemorySessionStore::new()))
        .template("{{user_input}}")
        .config(base_config())
        .build()
        .unwrap();

    let cancel = CancelToken::new();
    cancel.cancel();
    let result = engine.execute(&cancel, Request::new("hi")).await;
    assert!(matches!(result, Err(EngineError::Cancelled)));
}

#[tokio::test]
async fn cancellation_mid_llm_call_is_reported_as_cancelled_not_a_fallback() {
    let cancel = CancelToken::new();
    let llm = Arc::new(CancelsMidFlightLlm { cancel: cancel.clone() });
    let rule = FlowRule::new(
        "always_has_a_fallback",
        Condition::Always,
        Action::AiPrompt {
            system_prefix: "be helpful".into(),
            fallback: Some("fallback text".into()),
        },
    );
    let engine = EngineBuilder::new()
        .llm_client(llm)
        .session_store(Arc::new(InMemorySessionStore::new()))
        .flow_rule(rule)
        .template("{{user_input}}")
        .config(base_config())
        .build()
        .unwrap();

    let result = engine.execute(&cancel, Request::new("hi")).await;
    assert!(matches!(result, Err(EngineError::Cancelled)));
}

#[tokio::test]
async fn empty_input_is_rejected_without_touching_the_session_store() {
    let llm = Arc::new(ScriptedLlm::new(vec![]));
    let store = Arc::new(InMemorySessionStore::new());
    let engine = EngineBuilder::new()
        .llm_client(llm)
        .session_store(store.clone())
        .template("{{user_input}}")
        .config(base_config())
        .build()
        .unwrap();

    let result = engine.execute(&CancelToken::new(), Request::new("   ")).await;
    assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    assert!(store
        .list(&ac_sessions::SessionFilter::default(), &CancelToken::new())
        .is_empty());
}

#[tokio::test]
async fn history_limit_zero_means_no_history_fragments_are_gathered() {
    let llm = Arc::new(ScriptedLlm::new(vec![plain_response("ack")]));
    let store = Arc::new(InMemorySessionStore::new());
    let engine = EngineBuilder::new()
        .llm_client(llm)
        .session_store(store)
        .template("{{history}}\n{{user_input}}")
        .config(base_config())
        .build()
        .unwrap();

    let response = engine
        .execute(&CancelToken::new(), Request::new("first turn"))
        .await
        .unwrap();
    assert_eq!(response.output, "ack");
}

#[tokio::test]
async fn lookup_against_an_expired_session_is_session_not_found() {
    let llm = Arc::new(ScriptedLlm::new(vec![]));
    let store = Arc::new(InMemorySessionStore::new());
    let expired = store
        .create(
            ac_sessions::CreateOptions {
                ttl: Some(std::time::Duration::from_millis(1)),
                ..Default::default()
            },
            &CancelToken::new(),
        )
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let engine = EngineBuilder::new()
        .llm_client(llm)
        .session_store(store)
        .template("{{user_input}}")
        .config(base_config())
        .build()
        .unwrap();

    let result = engine
        .execute(&CancelToken::new(), Request::new("hi").with_session(expired.id))
        .await;
    assert!(matches!(result, Err(EngineError::SessionNotFound(_))));
}

#[tokio::test]
async fn mirrors_tool_exchanges_into_session_history_when_configured() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        tool_call_response("echo", r#"{"n": 1}"#),
        plain_response("done"),
    ]));
    let config = EngineConfig {
        mirror_tool_exchanges: true,
        ..base_config()
    };
    let engine = EngineBuilder::new()
        .llm_client(llm)
        .session_store(Arc::new(InMemorySessionStore::new()))
        .tool(Arc::new(EchoTool))
        .template("{{user_input}}")
        .config(config)
        .build()
        .unwrap();

    let response = engine
        .execute(&CancelToken::new(), Request::new("go"))
        .await
        .unwrap();

    // tool_call + tool_result + final user + final assistant
    assert_eq!(response.session.entries().len(), 4);
}

#[tokio::test]
async fn second_turn_in_same_session_sees_prior_history() {
    let llm = Arc::new(ScriptedLlm::new(vec![plain_response("first reply"), plain_response("second reply")]));
    let store = Arc::new(InMemorySessionStore::new());
    let engine = EngineBuilder::new()
        .llm_client(llm)
        .session_store(store)
        .template("{{history}}\n{{user_input}}")
        .config(EngineConfig {
            history_limit: 10,
            ..base_config()
        })
        .build()
        .unwrap();

    let first = engine
        .execute(&CancelToken::new(), Request::new("first message"))
        .await
        .unwrap();
    let second = engine
        .execute(
            &CancelToken::new(),
            Request::new("second message").with_session(first.session_id.clone()),
        )
        .await
        .unwrap();

    assert_eq!(second.session.entries().len(), 4);
    let roles: Vec<Role> = second
        .session
        .entries()
        .iter()
        .filter_map(|e| match e {
            ac_domain::SessionEntry::Message(m) => Some(m.message.role),
            _ => None,
        })
        .collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
}

use std::sync::Arc;

use ac_context::ContextProvider;
use ac_flow::FlowRule;
use ac_llm::LlmClient;
use ac_sessions::{CreateOptions, SessionStore};
use ac_tools::ToolRegistry;

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::EngineError;

/// Assembles and validates an `Engine`. Every collaborator is wired once, at
/// build time — the resulting `Engine` holds only `Arc`s and is safe to share
/// across concurrent callers.
pub struct EngineBuilder {
    llm_client: Option<Arc<dyn LlmClient>>,
    tool_registry: ToolRegistry,
    providers: Vec<Arc<dyn ContextProvider>>,
    session_store: Option<Arc<dyn SessionStore>>,
    flow_rules: Vec<FlowRule>,
    template: String,
    config: EngineConfig,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            llm_client: None,
            tool_registry: ToolRegistry::new(),
            providers: Vec::new(),
            session_store: None,
            flow_rules: Vec::new(),
            template: String::new(),
            config: EngineConfig::default(),
        }
    }

    pub fn llm_client(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.llm_client = Some(client);
        self
    }

    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    pub fn tool(mut self, tool: Arc<dyn ac_tools::Tool>) -> Self {
        self.tool_registry.register(tool);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn ContextProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn flow_rule(mut self, rule: FlowRule) -> Self {
        self.flow_rules.push(rule);
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Engine, EngineError> {
        self.config.validate()?;

        let llm_client = self
            .llm_client
            .ok_or_else(|| EngineError::InvalidInput("llm_client is required".into()))?;
        let session_store = self
            .session_store
            .ok_or_else(|| EngineError::InvalidInput("session_store is required".into()))?;

        let parsed_template = ac_prompt::parse(&self.template);
        let mut initial_metadata = std::collections::HashMap::new();
        initial_metadata.insert(
            "agent_version".into(),
            serde_json::json!(env!("CARGO_PKG_VERSION")),
        );
        let create_options = CreateOptions {
            id: None,
            ttl: Some(self.config.session_ttl),
            initial_metadata,
        };

        Ok(Engine {
            llm_client,
            tool_registry: Arc::new(self.tool_registry),
            providers: self.providers,
            session_store,
            flow_rules: self.flow_rules,
            template: parsed_template,
            config: self.config,
            create_options,
        })
    }
}

//! Runtime wiring: tool registry, orchestrator, store, and observability hooks.

use std::sync::Arc;

use pagent::{
    ConversationStore, InMemoryConversationStore, NoopOrchestratorHooks, Orchestrator,
    OrchestratorHooks, OrchestratorPolicy,
};
use pobserve::{LayeredHooks, MetricsObservabilityHooks, SafeHooks, TracingObservabilityHooks};
use pprovider::{CompletionProvider, NoopOperationHooks, ProviderOperationHooks};
use ptooling::{
    AnalyzeUserHealthDataArgs, BuiltinTool, GenerateHealthPlanTool, NoopToolRuntimeHooks,
    ToolError, ToolRegistry, ToolRuntimeHooks, parse_arguments,
};
use serde_json::{Map, Value, json};

#[derive(Clone)]
pub struct RuntimeHooks {
    pub provider: Arc<dyn ProviderOperationHooks>,
    pub tools: Arc<dyn ToolRuntimeHooks>,
    pub rounds: Arc<dyn OrchestratorHooks>,
}

impl RuntimeHooks {
    pub fn noop() -> Self {
        Self {
            provider: Arc::new(NoopOperationHooks),
            tools: Arc::new(NoopToolRuntimeHooks),
            rounds: Arc::new(NoopOrchestratorHooks),
        }
    }

    /// Uses one observer for provider, tool, and round callbacks.
    pub fn from_observer<H>(observer: H) -> Self
    where
        H: ProviderOperationHooks + ToolRuntimeHooks + OrchestratorHooks + 'static,
    {
        let observer = Arc::new(observer);
        Self {
            provider: observer.clone(),
            tools: observer.clone(),
            rounds: observer,
        }
    }

    /// Structured `tracing` events, isolated from observer panics.
    pub fn tracing() -> Self {
        Self::from_observer(SafeHooks::new(TracingObservabilityHooks))
    }

    /// `parley_*` counters and histograms, isolated from observer panics.
    pub fn metrics() -> Self {
        Self::from_observer(SafeHooks::new(MetricsObservabilityHooks))
    }

    /// Tracing and metrics together; each layer is isolated on its own.
    pub fn observed() -> Self {
        Self::from_observer(LayeredHooks::new(
            SafeHooks::new(TracingObservabilityHooks),
            SafeHooks::new(MetricsObservabilityHooks),
        ))
    }
}

impl Default for RuntimeHooks {
    fn default() -> Self {
        Self::tracing()
    }
}

#[derive(Clone)]
pub struct GatewayRuntime {
    pub orchestrator: Orchestrator,
    pub store: Arc<dyn ConversationStore>,
}

pub fn in_memory_store() -> Arc<dyn ConversationStore> {
    Arc::new(InMemoryConversationStore::new())
}

/// Registers the full builtin catalog. The plan generator is deterministic and the
/// health-data analyzer reads the store's user context. Web search and document reading
/// need host services, so here they settle as `Unavailable` and the provider still sees
/// every schema.
pub fn gateway_registry(store: Arc<dyn ConversationStore>) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    for tool in [BuiltinTool::SearchWeb, BuiltinTool::ReadDocuments] {
        registry.register(tool.with_handler(move |_args, _context| async move {
            Err(ToolError::unavailable(format!(
                "{} is not configured on this gateway",
                tool.name()
            )))
        }))?;
    }
    registry.register(BuiltinTool::AnalyzeUserHealthData.with_handler(move |args, _context| {
        let store = Arc::clone(&store);
        async move { analyze_user_health_data(store.as_ref(), &args).await }
    }))?;
    registry.register_typed(GenerateHealthPlanTool)?;
    Ok(registry)
}

async fn analyze_user_health_data(
    store: &dyn ConversationStore,
    args: &Map<String, Value>,
) -> Result<Value, ToolError> {
    let args: AnalyzeUserHealthDataArgs = parse_arguments(args)?;
    let user_id = args.user_id.to_string();

    let context = store
        .user_context(&user_id)
        .await
        .map_err(|err| ToolError::unavailable(format!("user data unavailable: {err}")))?
        .ok_or_else(|| ToolError::not_found(format!("no health data for user {user_id}")))?;

    let facts: Map<String, Value> = context
        .facts
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();

    Ok(json!({
        "user_id": args.user_id,
        "data_types": args.data_types,
        "date_range": args.date_range,
        "analysis_type": args.analysis_type,
        "display_name": context.display_name,
        "facts": facts,
    }))
}

pub fn build_runtime(
    provider: Arc<dyn CompletionProvider>,
) -> Result<GatewayRuntime, ToolError> {
    build_runtime_with_store(provider, in_memory_store())
}

pub fn build_runtime_with_store(
    provider: Arc<dyn CompletionProvider>,
    store: Arc<dyn ConversationStore>,
) -> Result<GatewayRuntime, ToolError> {
    let registry = gateway_registry(Arc::clone(&store))?;
    Ok(build_runtime_with(
        provider,
        Arc::new(registry),
        store,
        OrchestratorPolicy::default(),
        RuntimeHooks::default(),
    ))
}

pub fn build_runtime_with(
    provider: Arc<dyn CompletionProvider>,
    registry: Arc<ToolRegistry>,
    store: Arc<dyn ConversationStore>,
    policy: OrchestratorPolicy,
    hooks: RuntimeHooks,
) -> GatewayRuntime {
    let orchestrator = Orchestrator::builder(provider, registry)
        .hooks(hooks.rounds)
        .tool_hooks(hooks.tools)
        .policy(policy)
        .build();

    GatewayRuntime {
        orchestrator,
        store,
    }
}

#[cfg(feature = "provider-anthropic")]
pub use anthropic::anthropic_provider;

#[cfg(feature = "provider-anthropic")]
mod anthropic {
    use std::sync::Arc;

    use pprovider::adapters::anthropic::{AnthropicHttpTransport, AnthropicProvider};
    use pprovider::{CompletionProvider, ProviderError, RetryingProvider, SecureCredentialManager};

    use crate::GatewayConfig;

    use super::RuntimeHooks;

    /// Anthropic Messages provider wrapped in the configured retry policy.
    pub fn anthropic_provider(
        config: &GatewayConfig,
        hooks: &RuntimeHooks,
    ) -> Result<Arc<dyn CompletionProvider>, ProviderError> {
        let credentials = Arc::new(SecureCredentialManager::new());
        credentials.set_anthropic_api_key(config.api_key.expose())?;

        let mut transport = AnthropicHttpTransport::default();
        if let Some(base_url) = &config.base_url {
            transport = transport.with_base_url(base_url.clone());
        }

        let anthropic_config = config.anthropic_config();
        anthropic_config.validate()?;

        let provider = AnthropicProvider::new(credentials, Arc::new(transport))
            .with_config(anthropic_config);
        Ok(Arc::new(
            RetryingProvider::new(provider, config.retry_policy())
                .with_hooks(Arc::clone(&hooks.provider)),
        ))
    }
}

//! Unified facade over the parley workspace crates.
//!
//! Applications depend on this crate alone: it re-exports the orchestration engine,
//! the session protocol, tooling, providers, and observability hooks, and adds the
//! runtime builder, environment configuration, and the websocket gateway served by
//! the `parley-gateway` binary.
//!
//! ```rust
//! use parley::{QA_AGENT_PATH, RuntimeHooks, ServerMessage};
//!
//! let _hooks = RuntimeHooks::default();
//! assert_eq!(QA_AGENT_PATH, "/ws/qa-agent");
//! assert_eq!(ServerMessage::Pong.type_name(), "pong");
//! ```

pub mod config;
pub mod gateway;
pub mod prelude;
pub mod runtime;

pub use pagent;
pub use pcommon;
pub use pobserve;
pub use pprovider;
pub use psession;
pub use ptooling;

pub use pagent::{
    AgentResponse, ChannelStatusSink, ConversationStore, Feedback, InMemoryConversationStore,
    NewMessage, NoopOrchestratorHooks, NoopStatusSink, Orchestrator, OrchestratorBuilder,
    OrchestratorError, OrchestratorErrorKind, OrchestratorHooks, OrchestratorPolicy,
    QuestionRequest, Sender, StatusEvent, StatusKind, StatusSink, StoreError, StoreErrorKind,
    StoredMessage, UserContext,
};
pub use pcommon::{BoxFuture, ConversationId, MetadataMap, SessionId, TraceId};
pub use pobserve::{
    LayeredHooks, MetricsObservabilityHooks, SafeHooks, ToolFailureClass,
    TracingObservabilityHooks,
};
pub use pprovider::{
    CompletionProvider, Decision, NoopOperationHooks, ProviderError, ProviderErrorKind,
    ProviderFuture, ProviderId, ProviderOperationHooks, RetryPolicy, RetryingProvider,
    SecretString, SecureCredentialManager, StopReason, ToolCall, ToolOutcome, ToolResult,
    ToolSchema, Transcript, Turn,
};
pub use psession::{
    ClientMessage, ServerMessage, Session, SessionError, SessionErrorKind, SessionSink,
    SessionState,
};
pub use ptooling::{
    BuiltinTool, DefaultToolRuntime, GenerateHealthPlanTool, NoopToolRuntimeHooks, Tool,
    ToolError, ToolErrorKind, ToolExecutionContext, ToolExecutionResult, ToolFuture,
    ToolRegistry, ToolRuntime, ToolRuntimeHooks, TypedTool,
};

pub use config::{ConfigError, ConfigErrorKind, GatewayConfig};
pub use gateway::{GatewayState, QA_AGENT_PATH, router, serve};
#[cfg(feature = "provider-anthropic")]
pub use runtime::anthropic_provider;
pub use runtime::{
    GatewayRuntime, RuntimeHooks, build_runtime, build_runtime_with, build_runtime_with_store,
    gateway_registry, in_memory_store,
};

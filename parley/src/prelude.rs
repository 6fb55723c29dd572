//! Common imports for most parley applications.

pub use crate::{
    AgentResponse, CompletionProvider, ConversationStore, Decision, GatewayConfig,
    GatewayRuntime, InMemoryConversationStore, Orchestrator, OrchestratorPolicy, ProviderError,
    QuestionRequest, RuntimeHooks, ServerMessage, Session, SessionSink, StatusEvent, StatusSink,
    Tool, ToolCall, ToolError, ToolExecutionContext, ToolRegistry, Transcript, UserContext,
};
pub use crate::{build_runtime, build_runtime_with, build_runtime_with_store, router, serve};

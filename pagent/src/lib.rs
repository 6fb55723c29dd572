//! Orchestration engine: turns one user question into a bounded sequence of
//! concurrent tool rounds and a single [`AgentResponse`], streaming lifecycle
//! [`StatusEvent`]s while it works.
//!
//! ```rust
//! use pagent::{OrchestratorPolicy, StatusKind};
//!
//! let policy = OrchestratorPolicy::default().with_max_tool_rounds(2);
//! assert_eq!(policy.max_tool_rounds, 2);
//! assert_eq!(StatusKind::ToolStarted.as_str(), "tool_started");
//! ```

mod confidence;
mod dispatch;
mod error;
mod hooks;
mod orchestrator;
mod prompt;
mod status;
mod store;
mod types;

pub mod prelude {
    pub use crate::{
        AgentResponse, ConversationStore, InMemoryConversationStore, Orchestrator,
        OrchestratorError, OrchestratorErrorKind, OrchestratorHooks, OrchestratorPolicy,
        QuestionRequest, StatusEvent, StatusKind, StatusSink, StoreError, UserContext,
    };
}

pub use confidence::{NO_TOOL_CONFIDENCE, confidence};
pub use dispatch::dispatch_calls;
pub use error::{OrchestratorError, OrchestratorErrorKind, StoreError, StoreErrorKind};
pub use hooks::{NoopOrchestratorHooks, OrchestratorHooks};
pub use orchestrator::{
    DEFAULT_DEGRADED_ANSWER, Orchestrator, OrchestratorBuilder, OrchestratorPolicy,
};
pub use prompt::{DEFAULT_SYSTEM_PROMPT, build_context_prompt};
pub use status::{ChannelStatusSink, NoopStatusSink, StatusEvent, StatusKind, StatusSink};
pub use store::{
    ConversationStore, Feedback, InMemoryConversationStore, NewMessage, Sender, StoreFuture,
    StoredMessage, UserContext,
};
pub use types::{AgentResponse, QuestionRequest, new_response_id};

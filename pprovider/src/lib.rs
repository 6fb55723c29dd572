//! Provider-agnostic completion contracts for the parley agent gateway.
//!
//! A [`CompletionProvider`] is asked to [`decide`](CompletionProvider::decide) whether a
//! transcript needs tools, and later to [`finalize`](CompletionProvider::finalize) an answer
//! once tool results are appended. The Anthropic Messages API adapter lives under
//! [`adapters::anthropic`].
//!
//! ```rust
//! use pprovider::{Decision, RetryPolicy};
//!
//! let decision = Decision::direct("Stay hydrated.");
//! assert!(decision.tool_calls().is_empty());
//! assert_eq!(RetryPolicy::new(0).max_attempts, 1);
//! ```

pub mod adapters;
pub mod credentials;
pub mod error;
pub mod model;
pub mod prelude;
pub mod provider;
pub mod resilience;
pub mod schema;

pub use credentials::{SecretString, SecureCredentialManager};
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{Decision, StopReason, ToolCall, ToolOutcome, ToolResult, Transcript, Turn};
pub use provider::{CompletionProvider, ProviderFuture, ProviderId};
pub use resilience::{
    NoopOperationHooks, ProviderOperationHooks, RetryPolicy, RetryingProvider, execute_with_retry,
};
pub use schema::{ItemSpec, ParamKind, ParameterSpec, ToolSchema};

//! Common `pprovider` imports for downstream crates.

pub use crate::{
    CompletionProvider, Decision, NoopOperationHooks, ParamKind, ParameterSpec, ProviderError,
    ProviderErrorKind, ProviderFuture, ProviderId, ProviderOperationHooks, RetryPolicy,
    RetryingProvider, StopReason, ToolCall, ToolOutcome, ToolResult, ToolSchema, Transcript, Turn,
    execute_with_retry,
};
pub use pcommon::{BoxFuture, MetadataMap};

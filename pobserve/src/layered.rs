//! Fan one hook call out to two observers.
//!
//! ```rust
//! use pobserve::{LayeredHooks, MetricsObservabilityHooks, SafeHooks, TracingObservabilityHooks};
//! use ptooling::ToolRuntimeHooks;
//!
//! fn accepts_tool_hooks(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = LayeredHooks::new(
//!     SafeHooks::new(TracingObservabilityHooks),
//!     SafeHooks::new(MetricsObservabilityHooks),
//! );
//! accepts_tool_hooks(&hooks);
//! ```

use std::time::Duration;

use pagent::{OrchestratorError, OrchestratorHooks};
use pcommon::SessionId;
use pprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use ptooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

/// Calls `first`, then `second`. Nest to stack more than two.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayeredHooks<A, B> {
    first: A,
    second: B,
}

impl<A, B> LayeredHooks<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn layer<C>(self, next: C) -> LayeredHooks<Self, C> {
        LayeredHooks::new(self, next)
    }
}

impl<A, B> ProviderOperationHooks for LayeredHooks<A, B>
where
    A: ProviderOperationHooks,
    B: ProviderOperationHooks,
{
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, attempt: u32) {
        self.first.on_attempt_start(provider, operation, attempt);
        self.second.on_attempt_start(provider, operation, attempt);
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        self.first
            .on_retry_scheduled(provider, operation, attempt, delay, error);
        self.second
            .on_retry_scheduled(provider, operation, attempt, delay, error);
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        self.first.on_success(provider, operation, attempts);
        self.second.on_success(provider, operation, attempts);
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        self.first.on_failure(provider, operation, attempts, error);
        self.second.on_failure(provider, operation, attempts, error);
    }
}

impl<A, B> ToolRuntimeHooks for LayeredHooks<A, B>
where
    A: ToolRuntimeHooks,
    B: ToolRuntimeHooks,
{
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        self.first.on_execution_start(tool_call, context);
        self.second.on_execution_start(tool_call, context);
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        self.first
            .on_execution_success(tool_call, context, result, elapsed);
        self.second
            .on_execution_success(tool_call, context, result, elapsed);
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        self.first
            .on_execution_failure(tool_call, context, error, elapsed);
        self.second
            .on_execution_failure(tool_call, context, error, elapsed);
    }
}

impl<A, B> OrchestratorHooks for LayeredHooks<A, B>
where
    A: OrchestratorHooks,
    B: OrchestratorHooks,
{
    fn on_round_start(&self, session_id: &SessionId, response_id: &str) {
        self.first.on_round_start(session_id, response_id);
        self.second.on_round_start(session_id, response_id);
    }

    fn on_dispatch(&self, session_id: &SessionId, round: usize, call_count: usize) {
        self.first.on_dispatch(session_id, round, call_count);
        self.second.on_dispatch(session_id, round, call_count);
    }

    fn on_round_success(
        &self,
        session_id: &SessionId,
        response_id: &str,
        rounds: usize,
        elapsed: Duration,
    ) {
        self.first
            .on_round_success(session_id, response_id, rounds, elapsed);
        self.second
            .on_round_success(session_id, response_id, rounds, elapsed);
    }

    fn on_round_failure(
        &self,
        session_id: &SessionId,
        response_id: &str,
        error: &OrchestratorError,
        elapsed: Duration,
    ) {
        self.first
            .on_round_failure(session_id, response_id, error, elapsed);
        self.second
            .on_round_failure(session_id, response_id, error, elapsed);
    }
}

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use pagent::{OrchestratorError, OrchestratorHooks};
use pcommon::SessionId;
use pprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use ptooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

/// Isolates an observer so a panicking callback never reaches the provider, tool, or round
/// it is watching. Implements whichever hook traits the wrapped value does.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafeHooks<H> {
    inner: H,
}

impl<H> SafeHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

fn guard(callback: &'static str, f: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        tracing::warn!(callback, "observability hook panicked");
    }
}

impl<H: ProviderOperationHooks> ProviderOperationHooks for SafeHooks<H> {
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, attempt: u32) {
        guard("on_attempt_start", || {
            self.inner.on_attempt_start(provider, operation, attempt)
        });
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        guard("on_retry_scheduled", || {
            self.inner
                .on_retry_scheduled(provider, operation, attempt, delay, error)
        });
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        guard("on_success", || {
            self.inner.on_success(provider, operation, attempts)
        });
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        guard("on_failure", || {
            self.inner.on_failure(provider, operation, attempts, error)
        });
    }
}

impl<H: ToolRuntimeHooks> ToolRuntimeHooks for SafeHooks<H> {
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        guard("on_execution_start", || {
            self.inner.on_execution_start(tool_call, context)
        });
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        guard("on_execution_success", || {
            self.inner
                .on_execution_success(tool_call, context, result, elapsed)
        });
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        guard("on_execution_failure", || {
            self.inner
                .on_execution_failure(tool_call, context, error, elapsed)
        });
    }
}

impl<H: OrchestratorHooks> OrchestratorHooks for SafeHooks<H> {
    fn on_round_start(&self, session_id: &SessionId, response_id: &str) {
        guard("on_round_start", || {
            self.inner.on_round_start(session_id, response_id)
        });
    }

    fn on_dispatch(&self, session_id: &SessionId, round: usize, call_count: usize) {
        guard("on_dispatch", || {
            self.inner.on_dispatch(session_id, round, call_count)
        });
    }

    fn on_round_success(
        &self,
        session_id: &SessionId,
        response_id: &str,
        rounds: usize,
        elapsed: Duration,
    ) {
        guard("on_round_success", || {
            self.inner
                .on_round_success(session_id, response_id, rounds, elapsed)
        });
    }

    fn on_round_failure(
        &self,
        session_id: &SessionId,
        response_id: &str,
        error: &OrchestratorError,
        elapsed: Duration,
    ) {
        guard("on_round_failure", || {
            self.inner
                .on_round_failure(session_id, response_id, error, elapsed)
        });
    }
}

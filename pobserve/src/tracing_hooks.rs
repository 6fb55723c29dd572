//! Structured `tracing` events for providers, tool runtime, and rounds.
//!
//! Tool failures are logged by [`ToolFailureClass`]: rejected calls and outages are
//! warnings, executor failures are errors.
//!
//! ```rust
//! use pagent::OrchestratorHooks;
//! use pobserve::TracingObservabilityHooks;
//!
//! fn accepts_round_hooks(_hooks: &dyn OrchestratorHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_round_hooks(&hooks);
//! ```

use std::time::Duration;

use pagent::{OrchestratorError, OrchestratorHooks};
use pcommon::SessionId;
use pprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use ptooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

use crate::{ToolFailureClass, provider_error_label, round_error_label, tool_error_label};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderOperationHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, attempt: u32) {
        tracing::debug!(provider = %provider, operation, attempt, "provider attempt");
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        tracing::warn!(
            provider = %provider,
            operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = provider_error_label(error.kind),
            error = %error.message,
            "provider call failed, retrying"
        );
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        if attempts > 1 {
            tracing::info!(provider = %provider, operation, attempts, "provider recovered");
        } else {
            tracing::debug!(provider = %provider, operation, "provider call succeeded");
        }
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        tracing::error!(
            provider = %provider,
            operation,
            attempts,
            error_kind = provider_error_label(error.kind),
            retryable = error.retryable,
            error = %error.message,
            "provider call failed"
        );
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        tracing::info!(
            tool_name = %tool_call.name,
            tool_call_id = %tool_call.id,
            session_id = %context.session_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            "tool started"
        );
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        tracing::info!(
            tool_name = %tool_call.name,
            tool_call_id = %tool_call.id,
            session_id = %context.session_id,
            summary = %result.summary,
            elapsed_ms = elapsed.as_millis() as u64,
            "tool completed"
        );
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        let class = ToolFailureClass::of(error.kind);
        let elapsed_ms = elapsed.as_millis() as u64;
        match class {
            ToolFailureClass::Failed => tracing::error!(
                tool_name = %tool_call.name,
                tool_call_id = %tool_call.id,
                session_id = %context.session_id,
                outcome = class.as_str(),
                error_kind = tool_error_label(error.kind),
                elapsed_ms,
                error = %error.message,
                "tool failed"
            ),
            ToolFailureClass::Rejected => tracing::warn!(
                tool_name = %tool_call.name,
                tool_call_id = %tool_call.id,
                session_id = %context.session_id,
                outcome = class.as_str(),
                error_kind = tool_error_label(error.kind),
                error = %error.message,
                "tool call rejected before execution"
            ),
            ToolFailureClass::TimedOut | ToolFailureClass::Unavailable => tracing::warn!(
                tool_name = %tool_call.name,
                tool_call_id = %tool_call.id,
                session_id = %context.session_id,
                outcome = class.as_str(),
                error_kind = tool_error_label(error.kind),
                retryable = error.retryable,
                elapsed_ms,
                error = %error.message,
                "tool did not finish"
            ),
        }
    }
}

impl OrchestratorHooks for TracingObservabilityHooks {
    fn on_round_start(&self, session_id: &SessionId, response_id: &str) {
        tracing::info!(session_id = %session_id, response_id, "round started");
    }

    fn on_dispatch(&self, session_id: &SessionId, round: usize, call_count: usize) {
        tracing::info!(session_id = %session_id, round, call_count, "dispatching tool calls");
    }

    fn on_round_success(
        &self,
        session_id: &SessionId,
        response_id: &str,
        rounds: usize,
        elapsed: Duration,
    ) {
        tracing::info!(
            session_id = %session_id,
            response_id,
            rounds,
            elapsed_ms = elapsed.as_millis() as u64,
            "round answered"
        );
    }

    fn on_round_failure(
        &self,
        session_id: &SessionId,
        response_id: &str,
        error: &OrchestratorError,
        elapsed: Duration,
    ) {
        tracing::error!(
            session_id = %session_id,
            response_id,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = round_error_label(error.kind),
            provider_error_kind = error.provider_kind.map(provider_error_label),
            error = %error.message,
            "round degraded"
        );
    }
}

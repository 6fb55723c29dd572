//! `metrics` counters and histograms for providers, tool runtime, and rounds.
//!
//! Error labels use the snake_case values from [`crate::tool_error_label`] and friends so
//! dashboards do not depend on `Debug` output.
//!
//! ```rust
//! use pobserve::MetricsObservabilityHooks;
//! use pprovider::ProviderOperationHooks;
//!
//! fn accepts_provider_hooks(_hooks: &dyn ProviderOperationHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_provider_hooks(&hooks);
//! ```

use std::time::Duration;

use pagent::{OrchestratorError, OrchestratorHooks};
use pcommon::SessionId;
use pprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use ptooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

use crate::{ToolFailureClass, provider_error_label, round_error_label, tool_error_label};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ProviderOperationHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, _attempt: u32) {
        metrics::counter!(
            "parley_provider_attempts_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        _attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "parley_provider_retries_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string(),
            "error_kind" => provider_error_label(error.kind)
        )
        .increment(1);
        metrics::histogram!("parley_provider_retry_delay_seconds", "provider" => provider.to_string())
            .record(delay.as_secs_f64());
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        metrics::histogram!(
            "parley_provider_attempts_per_call",
            "provider" => provider.to_string(),
            "operation" => operation.to_string(),
            "status" => "success"
        )
        .record(f64::from(attempts));
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "parley_provider_failures_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string(),
            "error_kind" => provider_error_label(error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "parley_provider_attempts_per_call",
            "provider" => provider.to_string(),
            "operation" => operation.to_string(),
            "status" => "failure"
        )
        .record(f64::from(attempts));
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, _context: &ToolExecutionContext) {
        metrics::gauge!("parley_tool_calls_in_flight", "tool_name" => tool_call.name.clone())
            .increment(1.0);
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        metrics::gauge!("parley_tool_calls_in_flight", "tool_name" => tool_call.name.clone())
            .decrement(1.0);
        metrics::counter!(
            "parley_tool_calls_total",
            "tool_name" => tool_call.name.clone(),
            "outcome" => "completed"
        )
        .increment(1);
        metrics::histogram!(
            "parley_tool_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "outcome" => "completed"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        let class = ToolFailureClass::of(error.kind);
        metrics::gauge!("parley_tool_calls_in_flight", "tool_name" => tool_call.name.clone())
            .decrement(1.0);
        metrics::counter!(
            "parley_tool_calls_total",
            "tool_name" => tool_call.name.clone(),
            "outcome" => class.as_str(),
            "error_kind" => tool_error_label(error.kind)
        )
        .increment(1);
        // Rejected calls never ran, so their elapsed time says nothing about the tool.
        if class != ToolFailureClass::Rejected {
            metrics::histogram!(
                "parley_tool_duration_seconds",
                "tool_name" => tool_call.name.clone(),
                "outcome" => class.as_str()
            )
            .record(elapsed.as_secs_f64());
        }
    }
}

impl OrchestratorHooks for MetricsObservabilityHooks {
    fn on_round_start(&self, _session_id: &SessionId, _response_id: &str) {
        metrics::counter!("parley_rounds_started_total").increment(1);
    }

    fn on_dispatch(&self, _session_id: &SessionId, _round: usize, call_count: usize) {
        metrics::histogram!("parley_round_calls_per_dispatch").record(call_count as f64);
    }

    fn on_round_success(
        &self,
        _session_id: &SessionId,
        _response_id: &str,
        rounds: usize,
        elapsed: Duration,
    ) {
        metrics::histogram!("parley_round_tool_rounds").record(rounds as f64);
        metrics::histogram!("parley_round_duration_seconds", "status" => "answered")
            .record(elapsed.as_secs_f64());
    }

    fn on_round_failure(
        &self,
        _session_id: &SessionId,
        _response_id: &str,
        error: &OrchestratorError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "parley_rounds_degraded_total",
            "error_kind" => round_error_label(error.kind),
            "provider_error_kind" => error.provider_kind.map_or("none", provider_error_label)
        )
        .increment(1);
        metrics::histogram!("parley_round_duration_seconds", "status" => "degraded")
            .record(elapsed.as_secs_f64());
    }
}

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use pagent::{OrchestratorError, OrchestratorHooks};
use pcommon::SessionId;
use pprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use ptooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};
use serde_json::json;

use pagent::OrchestratorErrorKind;
use pprovider::ProviderErrorKind;
use ptooling::ToolErrorKind;

use crate::{
    LayeredHooks, MetricsObservabilityHooks, SafeHooks, ToolFailureClass,
    TracingObservabilityHooks, provider_error_label, round_error_label, tool_error_label,
};

fn sample_tool_call() -> ToolCall {
    ToolCall::from_value("call-1", "search_web", json!({"query": "sleep"}))
}

fn sample_tool_context() -> ToolExecutionContext {
    ToolExecutionContext::new("session-1").with_trace_id("trace-1")
}

fn sample_result() -> ToolExecutionResult {
    let now = SystemTime::now();
    ToolExecutionResult {
        call: sample_tool_call(),
        outcome: Ok(json!({"results": []})),
        summary: "Found relevant health information".to_string(),
        started_at: now,
        completed_at: now,
    }
}

fn fire_provider_hooks(hooks: &dyn ProviderOperationHooks) {
    let provider_error = ProviderError::timeout("provider timeout");
    hooks.on_attempt_start(ProviderId::Anthropic, "decide", 1);
    hooks.on_retry_scheduled(
        ProviderId::Anthropic,
        "decide",
        1,
        Duration::from_millis(10),
        &provider_error,
    );
    hooks.on_success(ProviderId::Anthropic, "decide", 2);
    hooks.on_failure(ProviderId::Anthropic, "finalize", 3, &provider_error);
}

fn fire_tool_hooks(hooks: &dyn ToolRuntimeHooks) {
    hooks.on_execution_start(&sample_tool_call(), &sample_tool_context());
    hooks.on_execution_success(
        &sample_tool_call(),
        &sample_tool_context(),
        &sample_result(),
        Duration::from_millis(20),
    );
    hooks.on_execution_failure(
        &sample_tool_call(),
        &sample_tool_context(),
        &ToolError::execution("tool failed"),
        Duration::from_millis(20),
    );
}

fn fire_every_tool_failure(hooks: &dyn ToolRuntimeHooks) {
    for error in [
        ToolError::unknown_tool("meditate"),
        ToolError::invalid_arguments("query must be a string"),
        ToolError::timeout("deadline of 20ms elapsed"),
        ToolError::unavailable("user data unavailable"),
        ToolError::execution("tool panicked: boom"),
    ] {
        hooks.on_execution_start(&sample_tool_call(), &sample_tool_context());
        hooks.on_execution_failure(
            &sample_tool_call(),
            &sample_tool_context(),
            &error,
            Duration::from_millis(5),
        );
    }
}

fn fire_round_hooks(hooks: &dyn OrchestratorHooks) {
    let session_id = SessionId::from("session-1");
    let error = OrchestratorError::from(ProviderError::unavailable("overloaded"));
    hooks.on_round_start(&session_id, "response-1");
    hooks.on_dispatch(&session_id, 1, 3);
    hooks.on_round_success(&session_id, "response-1", 1, Duration::from_millis(30));
    hooks.on_round_failure(&session_id, "response-2", &error, Duration::from_millis(30));
}

#[test]
fn tracing_hooks_smoke_test_all_callbacks() {
    let hooks = TracingObservabilityHooks;
    fire_provider_hooks(&hooks);
    fire_tool_hooks(&hooks);
    fire_every_tool_failure(&hooks);
    fire_round_hooks(&hooks);
}

#[test]
fn metrics_hooks_smoke_test_all_callbacks() {
    let hooks = MetricsObservabilityHooks;
    fire_provider_hooks(&hooks);
    fire_tool_hooks(&hooks);
    fire_every_tool_failure(&hooks);
    fire_round_hooks(&hooks);
}

#[test]
fn tool_failures_are_classified_by_how_the_call_ended() {
    assert_eq!(ToolFailureClass::of(ToolErrorKind::NotFound), ToolFailureClass::Rejected);
    assert_eq!(ToolFailureClass::of(ToolErrorKind::InvalidArguments), ToolFailureClass::Rejected);
    assert_eq!(ToolFailureClass::of(ToolErrorKind::Duplicate), ToolFailureClass::Rejected);
    assert_eq!(ToolFailureClass::of(ToolErrorKind::Timeout), ToolFailureClass::TimedOut);
    assert_eq!(ToolFailureClass::of(ToolErrorKind::Unavailable), ToolFailureClass::Unavailable);
    assert_eq!(ToolFailureClass::of(ToolErrorKind::Execution), ToolFailureClass::Failed);
}

#[test]
fn error_labels_are_snake_case() {
    assert_eq!(tool_error_label(ToolErrorKind::InvalidArguments), "invalid_arguments");
    assert_eq!(tool_error_label(ToolErrorKind::NotFound), "not_found");
    assert_eq!(provider_error_label(ProviderErrorKind::RateLimited), "rate_limited");
    assert_eq!(
        round_error_label(OrchestratorErrorKind::MalformedDecision),
        "malformed_decision"
    );
}

#[derive(Default, Clone)]
struct RecordingHooks {
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl RecordingHooks {
    fn record(&self, event: &'static str) {
        self.events.lock().expect("events lock").push(event);
    }
}

impl ProviderOperationHooks for RecordingHooks {
    fn on_attempt_start(&self, _provider: ProviderId, _operation: &str, _attempt: u32) {
        self.record("attempt_start");
    }

    fn on_retry_scheduled(
        &self,
        _provider: ProviderId,
        _operation: &str,
        _attempt: u32,
        _delay: Duration,
        _error: &ProviderError,
    ) {
        self.record("retry_scheduled");
    }

    fn on_success(&self, _provider: ProviderId, _operation: &str, _attempts: u32) {
        self.record("provider_success");
    }

    fn on_failure(
        &self,
        _provider: ProviderId,
        _operation: &str,
        _attempts: u32,
        _error: &ProviderError,
    ) {
        self.record("provider_failure");
    }
}

impl ToolRuntimeHooks for RecordingHooks {
    fn on_execution_start(&self, _tool_call: &ToolCall, _context: &ToolExecutionContext) {
        self.record("tool_start");
    }

    fn on_execution_success(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        _elapsed: Duration,
    ) {
        self.record("tool_success");
    }

    fn on_execution_failure(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
        self.record("tool_failure");
    }
}

impl OrchestratorHooks for RecordingHooks {
    fn on_round_start(&self, _session_id: &SessionId, _response_id: &str) {
        self.record("round_start");
    }

    fn on_dispatch(&self, _session_id: &SessionId, _round: usize, _call_count: usize) {
        self.record("dispatch");
    }

    fn on_round_success(
        &self,
        _session_id: &SessionId,
        _response_id: &str,
        _rounds: usize,
        _elapsed: Duration,
    ) {
        self.record("round_success");
    }

    fn on_round_failure(
        &self,
        _session_id: &SessionId,
        _response_id: &str,
        _error: &OrchestratorError,
        _elapsed: Duration,
    ) {
        self.record("round_failure");
    }
}

struct PanicHooks;

impl ProviderOperationHooks for PanicHooks {
    fn on_attempt_start(&self, _provider: ProviderId, _operation: &str, _attempt: u32) {
        panic!("attempt_start panic");
    }

    fn on_retry_scheduled(
        &self,
        _provider: ProviderId,
        _operation: &str,
        _attempt: u32,
        _delay: Duration,
        _error: &ProviderError,
    ) {
        panic!("retry_scheduled panic");
    }

    fn on_success(&self, _provider: ProviderId, _operation: &str, _attempts: u32) {
        panic!("success panic");
    }

    fn on_failure(
        &self,
        _provider: ProviderId,
        _operation: &str,
        _attempts: u32,
        _error: &ProviderError,
    ) {
        panic!("failure panic");
    }
}

impl ToolRuntimeHooks for PanicHooks {
    fn on_execution_start(&self, _tool_call: &ToolCall, _context: &ToolExecutionContext) {
        panic!("start panic");
    }

    fn on_execution_success(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        _elapsed: Duration,
    ) {
        panic!("success panic");
    }

    fn on_execution_failure(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
        panic!("failure panic");
    }
}

impl OrchestratorHooks for PanicHooks {
    fn on_round_start(&self, _session_id: &SessionId, _response_id: &str) {
        panic!("round start panic");
    }

    fn on_dispatch(&self, _session_id: &SessionId, _round: usize, _call_count: usize) {
        panic!("dispatch panic");
    }

    fn on_round_success(
        &self,
        _session_id: &SessionId,
        _response_id: &str,
        _rounds: usize,
        _elapsed: Duration,
    ) {
        panic!("round success panic");
    }

    fn on_round_failure(
        &self,
        _session_id: &SessionId,
        _response_id: &str,
        _error: &OrchestratorError,
        _elapsed: Duration,
    ) {
        panic!("round failure panic");
    }
}

#[test]
fn safe_hooks_delegate_when_inner_succeeds() {
    let inner = RecordingHooks::default();
    let events = Arc::clone(&inner.events);

    let safe = SafeHooks::new(inner);
    fire_provider_hooks(&safe);
    fire_tool_hooks(&safe);
    fire_round_hooks(&safe);

    assert_eq!(
        events.lock().expect("events lock").clone(),
        vec![
            "attempt_start",
            "retry_scheduled",
            "provider_success",
            "provider_failure",
            "tool_start",
            "tool_success",
            "tool_failure",
            "round_start",
            "dispatch",
            "round_success",
            "round_failure",
        ]
    );
}

#[test]
fn safe_hooks_swallow_panics() {
    let safe = SafeHooks::new(PanicHooks);
    fire_provider_hooks(&safe);
    fire_tool_hooks(&safe);
    fire_round_hooks(&safe);
}

#[test]
fn layered_hooks_reach_both_observers_in_order() {
    let first = RecordingHooks::default();
    let second = RecordingHooks::default();
    let (first_events, second_events) = (Arc::clone(&first.events), Arc::clone(&second.events));

    let layered = LayeredHooks::new(first, second);
    fire_tool_hooks(&layered);
    fire_round_hooks(&layered);

    let expected = vec![
        "tool_start",
        "tool_success",
        "tool_failure",
        "round_start",
        "dispatch",
        "round_success",
        "round_failure",
    ];
    assert_eq!(first_events.lock().expect("events lock").clone(), expected);
    assert_eq!(second_events.lock().expect("events lock").clone(), expected);
}

#[test]
fn a_panicking_layer_does_not_silence_the_next_one() {
    let recorder = RecordingHooks::default();
    let events = Arc::clone(&recorder.events);

    let layered = LayeredHooks::new(SafeHooks::new(PanicHooks), SafeHooks::new(recorder))
        .layer(SafeHooks::new(TracingObservabilityHooks));
    fire_provider_hooks(&layered);

    assert_eq!(
        events.lock().expect("events lock").clone(),
        vec!["attempt_start", "retry_scheduled", "provider_success", "provider_failure"]
    );
}

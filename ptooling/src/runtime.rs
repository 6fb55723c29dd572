//! Tool runtime trait and default registry-backed executor.
//!
//! Execution is split in two so callers can announce every call before any of them runs:
//! [`ToolRuntime::prepare`] resolves and validates synchronously, [`ToolRuntime::run`]
//! drives the executor. Neither step fails; problems settle as a failed
//! [`ToolExecutionResult`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use futures_util::FutureExt;
use pcommon::elapsed_between;
use pprovider::ToolCall;
use serde_json::{Map, Value};

use crate::{
    DEFAULT_SUCCESS_SUMMARY, NoopToolRuntimeHooks, Tool, ToolError, ToolExecutionContext,
    ToolExecutionResult, ToolFuture, ToolRegistry, ToolRuntimeHooks, default_call_description,
    validate_arguments, with_deadline,
};

/// A resolved, validated call that has not started yet.
pub struct PreparedCall {
    pub call: ToolCall,
    pub description: String,
    plan: Result<(Arc<dyn Tool>, Map<String, Value>), ToolError>,
}

impl PreparedCall {
    pub fn is_runnable(&self) -> bool {
        self.plan.is_ok()
    }
}

pub trait ToolRuntime: Send + Sync {
    fn prepare(&self, tool_call: ToolCall) -> PreparedCall;

    fn run<'a>(
        &'a self,
        prepared: PreparedCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, ToolExecutionResult>;

    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, ToolExecutionResult> {
        let prepared = self.prepare(tool_call);
        self.run(prepared, context)
    }
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    registry: Arc<ToolRegistry>,
    hooks: Arc<dyn ToolRuntimeHooks>,
    timeout: Option<Duration>,
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(NoopToolRuntimeHooks),
            timeout: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    async fn invoke(
        &self,
        tool: &dyn Tool,
        args: &Map<String, Value>,
        context: &ToolExecutionContext,
    ) -> Result<Value, ToolError> {
        // Handlers may panic while building their future, not only while it is polled.
        let guarded = AssertUnwindSafe(async move { tool.invoke(args, context).await })
            .catch_unwind()
            .map(|outcome| outcome.unwrap_or_else(|panic| Err(panic_error(panic))));

        match self.timeout {
            Some(deadline) => with_deadline(guarded, deadline).await,
            None => guarded.await,
        }
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn prepare(&self, tool_call: ToolCall) -> PreparedCall {
        let plan = self.registry.resolve(&tool_call.name).and_then(|tool| {
            let schema = tool.schema();
            let args = validate_arguments(&schema, &tool_call.arguments)?;
            Ok((tool, args))
        });

        let description = match &plan {
            Ok((tool, args)) => describe_guarded(tool.as_ref(), &tool_call.name, args),
            Err(_) => self
                .registry
                .get(&tool_call.name)
                .map(|tool| {
                    describe_guarded(tool.as_ref(), &tool_call.name, &tool_call.arguments)
                })
                .unwrap_or_else(|| default_call_description(&tool_call.name)),
        };

        PreparedCall {
            call: tool_call,
            description,
            plan,
        }
    }

    fn run<'a>(
        &'a self,
        prepared: PreparedCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, ToolExecutionResult> {
        Box::pin(async move {
            let PreparedCall { call, plan, .. } = prepared;
            let started_at = SystemTime::now();
            self.hooks.on_execution_start(&call, &context);

            let (outcome, summary) = match plan {
                Ok((tool, args)) => match self.invoke(tool.as_ref(), &args, &context).await {
                    Ok(value) => {
                        let summary = summarize_guarded(tool.as_ref(), &value);
                        (Ok(value), summary)
                    }
                    Err(error) => {
                        let summary = error.message.clone();
                        (Err(error), summary)
                    }
                },
                Err(error) => {
                    let summary = error.message.clone();
                    (Err(error), summary)
                }
            };

            let outcome = outcome.map_err(|error| {
                error
                    .with_tool_name(call.name.clone())
                    .with_tool_call_id(call.id.clone())
            });
            let completed_at = SystemTime::now();
            let elapsed = elapsed_between(started_at, completed_at);
            let result = ToolExecutionResult {
                call,
                outcome,
                summary,
                started_at,
                completed_at,
            };

            match &result.outcome {
                Ok(_) => self
                    .hooks
                    .on_execution_success(&result.call, &context, &result, elapsed),
                Err(error) => self
                    .hooks
                    .on_execution_failure(&result.call, &context, error, elapsed),
            }

            result
        })
    }
}

fn describe_guarded(tool: &dyn Tool, name: &str, args: &Map<String, Value>) -> String {
    panic::catch_unwind(AssertUnwindSafe(|| tool.describe_call(args)))
        .unwrap_or_else(|_| default_call_description(name))
}

fn summarize_guarded(tool: &dyn Tool, value: &Value) -> String {
    panic::catch_unwind(AssertUnwindSafe(|| tool.summarize_success(value)))
        .unwrap_or_else(|_| DEFAULT_SUCCESS_SUMMARY.to_string())
}

fn panic_error(panic: Box<dyn std::any::Any + Send>) -> ToolError {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|text| text.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());

    ToolError::execution(format!("tool panicked: {detail}"))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures_timer::Delay;
    use pprovider::{ParamKind, ParameterSpec, ToolSchema};
    use serde_json::json;

    use super::*;
    use crate::ToolErrorKind;

    fn call(id: &str, name: &str, args: Value) -> ToolCall {
        ToolCall::from_value(id, name, args)
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register_sync_fn(
                ToolSchema::new("echo", "Echoes arguments").parameter(
                    ParameterSpec::optional("text", ParamKind::String, "Text")
                        .with_default(json!("default")),
                ),
                |args, context| {
                    Ok(json!(format!(
                        "session={} text={}",
                        context.session_id,
                        args["text"].as_str().unwrap_or_default()
                    )))
                },
            )
            .expect("echo registers");
        registry
            .register_sync_fn(ToolSchema::new("broken", "Always fails"), |_, _| {
                Err(ToolError::execution("tool exploded"))
            })
            .expect("broken registers");
        registry
            .register_fn(ToolSchema::new("panicky", "Panics"), |_, _| async move {
                if true {
                    panic!("boom");
                }
                Ok(json!(null))
            })
            .expect("panicky registers");
        registry
            .register_sync_fn(ToolSchema::new("sync_panicky", "Panics before returning"), |_, _| {
                panic!("sync boom")
            })
            .expect("sync_panicky registers");
        registry
            .register_fn(ToolSchema::new("slow", "Sleeps"), |_, _| async move {
                Delay::new(Duration::from_secs(2)).await;
                Ok(json!("late"))
            })
            .expect("slow registers");
        registry
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ToolRuntimeHooks for RecordingHooks {
        fn on_execution_start(&self, tool_call: &ToolCall, _context: &ToolExecutionContext) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("start:{}", tool_call.name));
        }

        fn on_execution_success(
            &self,
            tool_call: &ToolCall,
            _context: &ToolExecutionContext,
            _result: &ToolExecutionResult,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("success:{}", tool_call.name));
        }

        fn on_execution_failure(
            &self,
            tool_call: &ToolCall,
            _context: &ToolExecutionContext,
            error: &ToolError,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("failure:{}:{:?}", tool_call.name, error.kind));
        }
    }

    #[tokio::test]
    async fn runtime_executes_registered_tool_with_defaults() {
        let hooks = Arc::new(RecordingHooks::default());
        let runtime = DefaultToolRuntime::new(Arc::new(registry())).with_hooks(hooks.clone());

        let result = runtime
            .execute(call("call_1", "echo", json!({})), ToolExecutionContext::new("session-1"))
            .await;

        assert_eq!(result.call.id, "call_1");
        assert_eq!(result.outcome, Ok(json!("session=session-1 text=default")));
        assert_eq!(result.summary, "Completed successfully");
        assert_eq!(
            hooks.events.lock().expect("events lock").clone(),
            vec!["start:echo", "success:echo"]
        );
    }

    #[tokio::test]
    async fn unknown_and_invalid_calls_settle_as_failures() {
        let runtime = DefaultToolRuntime::new(Arc::new(registry()));

        let prepared = runtime.prepare(call("call_2", "missing", json!({})));
        assert!(!prepared.is_runnable());
        assert_eq!(prepared.description, "Executing missing");
        let result = runtime
            .run(prepared, ToolExecutionContext::new("session-2"))
            .await;
        let error = result.outcome.expect_err("unknown tool");
        assert_eq!(error.kind, ToolErrorKind::NotFound);
        assert_eq!(error.tool_call_id.as_deref(), Some("call_2"));
        assert_eq!(result.summary, "Unknown tool: missing");

        let result = runtime
            .execute(
                call("call_3", "echo", json!({"text": 5})),
                ToolExecutionContext::new("session-2"),
            )
            .await;
        assert_eq!(
            result.outcome.expect_err("invalid argument").kind,
            ToolErrorKind::InvalidArguments
        );
    }

    #[tokio::test]
    async fn runtime_propagates_tool_execution_error() {
        let runtime = DefaultToolRuntime::new(Arc::new(registry()));

        let result = runtime
            .execute(call("call_4", "broken", json!({})), ToolExecutionContext::new("s"))
            .await;

        assert!(!result.is_success());
        assert_eq!(result.summary, "tool exploded");
        let tool_result = result.into_tool_result();
        assert_eq!(tool_result.content_text(), "Error executing broken: tool exploded");
    }

    #[tokio::test]
    async fn panics_become_execution_failures() {
        let runtime = DefaultToolRuntime::new(Arc::new(registry()));

        let result = runtime
            .execute(call("call_5", "panicky", json!({})), ToolExecutionContext::new("s"))
            .await;

        let error = result.outcome.expect_err("panic should be caught");
        assert_eq!(error.kind, ToolErrorKind::Execution);
        assert!(error.message.contains("boom"));
    }

    #[tokio::test]
    async fn synchronous_handler_panics_become_execution_failures() {
        let hooks = Arc::new(RecordingHooks::default());
        let runtime = DefaultToolRuntime::new(Arc::new(registry())).with_hooks(hooks.clone());

        let result = runtime
            .execute(
                call("call_7", "sync_panicky", json!({})),
                ToolExecutionContext::new("s"),
            )
            .await;

        let error = result.outcome.expect_err("panic should be caught");
        assert_eq!(error.kind, ToolErrorKind::Execution);
        assert!(error.message.contains("sync boom"));
        assert_eq!(error.tool_call_id.as_deref(), Some("call_7"));
        assert_eq!(
            hooks.events.lock().expect("events lock").clone(),
            vec!["start:sync_panicky", "failure:sync_panicky:Execution"]
        );
    }

    struct LoudTool;

    impl Tool for LoudTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema::new("loud", "Panics while describing itself")
        }

        fn invoke<'a>(
            &'a self,
            _args: &'a Map<String, Value>,
            _context: &'a ToolExecutionContext,
        ) -> ToolFuture<'a, Result<Value, ToolError>> {
            Box::pin(async move { Ok(json!("done")) })
        }

        fn describe_call(&self, _args: &Map<String, Value>) -> String {
            panic!("describe boom")
        }

        fn summarize_success(&self, _output: &Value) -> String {
            panic!("summary boom")
        }
    }

    #[tokio::test]
    async fn panicking_descriptions_fall_back_to_defaults() {
        let mut registry = ToolRegistry::new();
        registry.register(LoudTool).expect("loud registers");
        let runtime = DefaultToolRuntime::new(Arc::new(registry));

        let prepared = runtime.prepare(call("call_8", "loud", json!({})));
        assert_eq!(prepared.description, "Executing loud");

        let result = runtime
            .run(prepared, ToolExecutionContext::new("s"))
            .await;
        assert_eq!(result.outcome, Ok(json!("done")));
        assert_eq!(result.summary, DEFAULT_SUCCESS_SUMMARY);
    }

    #[tokio::test]
    async fn timeouts_apply_per_call() {
        let runtime = DefaultToolRuntime::new(Arc::new(registry()))
            .with_timeout(Some(Duration::from_millis(20)));

        let result = runtime
            .execute(call("call_6", "slow", json!({})), ToolExecutionContext::new("s"))
            .await;

        assert_eq!(
            result.outcome.expect_err("deadline").kind,
            ToolErrorKind::Timeout
        );
    }
}

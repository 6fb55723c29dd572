//! Concurrent fan-out of one decision's tool calls.
//!
//! Every call is prepared and announced before any of them runs, so a session always
//! sees all `tool_started` events ahead of the first terminal event. Terminal events
//! follow settle order; the returned results follow issue order.

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use pprovider::ToolCall;
use ptooling::{ToolExecutionContext, ToolExecutionResult, ToolRuntime};

use crate::{StatusEvent, StatusSink};

pub async fn dispatch_calls(
    runtime: &dyn ToolRuntime,
    sink: &dyn StatusSink,
    calls: Vec<ToolCall>,
    context: &ToolExecutionContext,
) -> Vec<ToolExecutionResult> {
    let prepared = calls
        .into_iter()
        .map(|call| runtime.prepare(call))
        .collect::<Vec<_>>();

    for call in &prepared {
        sink.publish(StatusEvent::tool_started(
            call.call.name.clone(),
            call.description.clone(),
        ));
    }

    let mut in_flight = prepared
        .into_iter()
        .enumerate()
        .map(|(index, call)| {
            let run = runtime.run(call, context.clone());
            async move { (index, run.await) }
        })
        .collect::<FuturesUnordered<_>>();

    let mut settled = Vec::with_capacity(in_flight.len());
    while let Some((index, result)) = in_flight.next().await {
        let event = if result.is_success() {
            StatusEvent::tool_completed(result.call.name.clone(), result.summary.clone())
        } else {
            StatusEvent::tool_error(result.call.name.clone(), result.summary.clone())
        };
        sink.publish(event);
        settled.push((index, result));
    }

    settled.sort_by_key(|(index, _)| *index);
    settled.into_iter().map(|(_, result)| result).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use futures_timer::Delay;
    use pprovider::ToolSchema;
    use ptooling::{DefaultToolRuntime, ToolRegistry};
    use serde_json::json;

    use super::*;
    use crate::StatusKind;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<StatusEvent>>,
    }

    impl StatusSink for RecordingSink {
        fn publish(&self, event: StatusEvent) {
            self.events.lock().expect("events lock").push(event);
        }
    }

    fn runtime() -> DefaultToolRuntime {
        let mut registry = ToolRegistry::new();
        registry
            .register_fn(ToolSchema::new("slow", "Sleeps first"), |_, _| async move {
                Delay::new(Duration::from_millis(40)).await;
                Ok(json!("slow done"))
            })
            .expect("slow registers");
        registry
            .register_sync_fn(ToolSchema::new("fast", "Returns at once"), |_, _| {
                Ok(json!("fast done"))
            })
            .expect("fast registers");
        DefaultToolRuntime::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn starts_precede_terminals_and_results_keep_issue_order() {
        let runtime = runtime();
        let sink = RecordingSink::default();
        let calls = vec![
            ToolCall::from_value("c1", "slow", json!({})),
            ToolCall::from_value("c2", "fast", json!({})),
            ToolCall::from_value("c3", "ghost", json!({})),
        ];

        let results = dispatch_calls(
            &runtime,
            &sink,
            calls,
            &ToolExecutionContext::new("session-1"),
        )
        .await;

        let ids = results
            .iter()
            .map(|result| result.call.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
        assert!(results[0].is_success());
        assert!(!results[2].is_success());

        let events = sink.events.lock().expect("events lock");
        assert_eq!(events.len(), 6);
        assert!(events[..3].iter().all(|event| event.kind == StatusKind::ToolStarted));
        assert!(events[3..].iter().all(|event| event.kind.is_terminal_tool_event()));
        assert_eq!(events[5].tool_name.as_deref(), Some("slow"));
        let ghost = events[3..]
            .iter()
            .find(|event| event.tool_name.as_deref() == Some("ghost"))
            .expect("ghost terminal event");
        assert_eq!(ghost.kind, StatusKind::ToolError);
        assert_eq!(ghost.message, "Unknown tool: ghost");
    }

    #[tokio::test]
    async fn empty_dispatch_emits_nothing() {
        let runtime = runtime();
        let sink = RecordingSink::default();

        let results =
            dispatch_calls(&runtime, &sink, Vec::new(), &ToolExecutionContext::new("s")).await;

        assert!(results.is_empty());
        assert!(sink.events.lock().expect("events lock").is_empty());
    }
}

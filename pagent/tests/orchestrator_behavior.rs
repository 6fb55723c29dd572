use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_timer::Delay;
use pagent::{
    ChannelStatusSink, DEFAULT_DEGRADED_ANSWER, Orchestrator, OrchestratorError,
    OrchestratorErrorKind, OrchestratorHooks, OrchestratorPolicy, QuestionRequest, StatusEvent,
    StatusKind, UserContext,
};
use pcommon::SessionId;
use pprovider::{
    CompletionProvider, Decision, ProviderError, ProviderFuture, ProviderId, ToolCall, ToolSchema,
    Transcript, Turn,
};
use ptooling::{BuiltinTool, ToolError, ToolRegistry};
use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Default)]
struct ScriptedProvider {
    decisions: Mutex<VecDeque<Result<Decision, ProviderError>>>,
    finals: Mutex<VecDeque<Result<String, ProviderError>>>,
    seen: Mutex<Vec<Transcript>>,
}

impl ScriptedProvider {
    fn deciding(decisions: Vec<Result<Decision, ProviderError>>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into()),
            ..Self::default()
        }
    }

    fn finalizing(self, text: &str) -> Self {
        self.finals
            .lock()
            .expect("finals lock")
            .push_back(Ok(text.to_string()));
        self
    }
}

impl CompletionProvider for ScriptedProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Custom("scripted")
    }

    fn decide<'a>(
        &'a self,
        transcript: &'a Transcript,
        _schemas: &'a [ToolSchema],
    ) -> ProviderFuture<'a, Result<Decision, ProviderError>> {
        Box::pin(async move {
            self.seen.lock().expect("seen lock").push(transcript.clone());
            self.decisions
                .lock()
                .expect("decisions lock")
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::other("no scripted decision")))
        })
    }

    fn finalize<'a>(
        &'a self,
        transcript: &'a Transcript,
        _schemas: &'a [ToolSchema],
    ) -> ProviderFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            self.seen.lock().expect("seen lock").push(transcript.clone());
            self.finals
                .lock()
                .expect("finals lock")
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::other("no scripted final answer")))
        })
    }
}

#[derive(Default)]
struct RecordingHooks {
    events: Mutex<Vec<String>>,
}

impl OrchestratorHooks for RecordingHooks {
    fn on_round_start(&self, _session_id: &SessionId, _response_id: &str) {
        self.events.lock().expect("events lock").push("start".to_string());
    }

    fn on_dispatch(&self, _session_id: &SessionId, round: usize, call_count: usize) {
        self.events
            .lock()
            .expect("events lock")
            .push(format!("dispatch:{round}:{call_count}"));
    }

    fn on_round_success(
        &self,
        _session_id: &SessionId,
        _response_id: &str,
        rounds: usize,
        _elapsed: Duration,
    ) {
        self.events
            .lock()
            .expect("events lock")
            .push(format!("success:{rounds}"));
    }

    fn on_round_failure(
        &self,
        _session_id: &SessionId,
        _response_id: &str,
        error: &OrchestratorError,
        _elapsed: Duration,
    ) {
        self.events
            .lock()
            .expect("events lock")
            .push(format!("failure:{:?}", error.kind));
    }
}

fn registry() -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry
        .register(BuiltinTool::SearchWeb.with_handler(|args, _ctx| async move {
            Delay::new(Duration::from_millis(20)).await;
            Ok(json!({"results": [format!("about {}", args["query"])]}))
        }))
        .expect("search registers");
    registry
        .register(BuiltinTool::ReadDocuments.with_handler(|_args, _ctx| async move {
            Err(ToolError::execution("folder is unreadable"))
        }))
        .expect("documents register");
    registry
        .register(BuiltinTool::AnalyzeUserHealthData.with_handler(|args, _ctx| async move {
            Ok(json!({"user_id": args["user_id"], "summary": "steady progress"}))
        }))
        .expect("analysis registers");
    Arc::new(registry)
}

fn drain(receiver: &mut UnboundedReceiver<StatusEvent>) -> Vec<StatusEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

fn orchestrator(provider: Arc<ScriptedProvider>) -> (Orchestrator, UnboundedReceiver<StatusEvent>) {
    let (sink, receiver) = ChannelStatusSink::new();
    let orchestrator = Orchestrator::builder(provider, registry())
        .status_sink(Arc::new(sink))
        .build();
    (orchestrator, receiver)
}

#[tokio::test]
async fn parallel_round_streams_every_start_before_any_terminal_event() {
    let provider = Arc::new(
        ScriptedProvider::deciding(vec![Ok(Decision::tool_request(vec![
            ToolCall::from_value("t1", "search_web", json!({"query": "protein timing"})),
            ToolCall::from_value("t2", "read_documents", json!({"folder_path": "/papers"})),
            ToolCall::from_value("t3", "analyze_user_health_data", json!({"user_id": 7})),
        ])
        .with_commentary("Let me look at research and your data."))])
        .finalizing("Eat protein within two hours of training."),
    );
    let (orchestrator, mut events) = orchestrator(Arc::clone(&provider));

    let response = orchestrator
        .answer(QuestionRequest::new("session-1", "When should I eat protein?"))
        .await;

    assert_eq!(response.answer, "Eat protein within two hours of training.");
    assert_eq!(
        response.tools_used,
        vec!["search_web", "read_documents", "analyze_user_health_data"]
    );
    assert_eq!((response.confidence * 1000.0).round() / 1000.0, 0.667);
    assert_eq!(
        response.reasoning_steps,
        vec!["Let me look at research and your data."]
    );
    assert_eq!(response.rounds, 1);
    assert!(!response.response_id.is_empty());

    let events = drain(&mut events);
    assert_eq!(events.len(), 6);
    assert!(events[..3].iter().all(|event| event.kind == StatusKind::ToolStarted));
    assert_eq!(events[0].message, "Searching the web for: protein timing");
    assert_eq!(events[1].message, "Reading documents from: /papers");
    assert!(events[3..].iter().all(|event| event.kind.is_terminal_tool_event()));
    let failed = events[3..]
        .iter()
        .find(|event| event.kind == StatusKind::ToolError)
        .expect("documents failure event");
    assert_eq!(failed.tool_name.as_deref(), Some("read_documents"));
    assert_eq!(failed.message, "folder is unreadable");

    let seen = provider.seen.lock().expect("seen lock");
    assert_eq!(seen.len(), 2);
    let results = match seen[1].turns().last() {
        Some(Turn::ToolResults(results)) => results.clone(),
        other => panic!("expected tool results, got {other:?}"),
    };
    let ids = results
        .iter()
        .map(|result| result.call_id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["t1", "t2", "t3"]);
    assert_eq!(
        results[1].content_text(),
        "Error executing read_documents: folder is unreadable"
    );
}

#[tokio::test]
async fn unknown_tool_fails_alone() {
    let provider = Arc::new(
        ScriptedProvider::deciding(vec![Ok(Decision::tool_request(vec![
            ToolCall::from_value("a", "search_web", json!({"query": "sleep"})),
            ToolCall::from_value("b", "meditate", json!({})),
        ]))])
        .finalizing("Sleep seven to nine hours."),
    );
    let (orchestrator, mut events) = orchestrator(provider);

    let response = orchestrator
        .answer(QuestionRequest::new("session-2", "How much sleep?"))
        .await;

    assert_eq!(response.tools_used, vec!["search_web", "meditate"]);
    assert_eq!(response.confidence, 0.5);

    let events = drain(&mut events);
    assert_eq!(events.len(), 4);
    let unknown = events
        .iter()
        .filter(|event| event.tool_name.as_deref() == Some("meditate"))
        .collect::<Vec<_>>();
    assert_eq!(unknown.len(), 2);
    assert_eq!(unknown[0].kind, StatusKind::ToolStarted);
    assert_eq!(unknown[0].message, "Executing meditate");
    assert_eq!(unknown[1].kind, StatusKind::ToolError);
    assert_eq!(unknown[1].message, "Unknown tool: meditate");
    assert!(
        events
            .iter()
            .any(|event| event.kind == StatusKind::ToolCompleted
                && event.message == "Found relevant health information")
    );
}

#[tokio::test]
async fn direct_answers_are_stable_and_silent() {
    for _ in 0..2 {
        let provider = Arc::new(ScriptedProvider::deciding(vec![Ok(Decision::direct(
            "Drink water.",
        ))]));
        let (orchestrator, mut events) = orchestrator(Arc::clone(&provider));

        let response = orchestrator
            .answer(
                QuestionRequest::new("session-3", "Hydration tips?")
                    .with_user_context(UserContext::new("7").with_fact("Current Goals", "Run")),
            )
            .await;

        assert_eq!(response.answer, "Drink water.");
        assert_eq!(response.confidence, 0.8);
        assert!(response.tools_used.is_empty());
        assert!(response.reasoning_steps.is_empty());
        assert_eq!(response.rounds, 0);
        assert!(drain(&mut events).is_empty());

        let seen = provider.seen.lock().expect("seen lock");
        assert_eq!(seen.len(), 1);
        let prompt = match seen[0].turns().last() {
            Some(Turn::User(text)) => text.clone(),
            other => panic!("expected the context prompt, got {other:?}"),
        };
        assert!(prompt.contains("User Question: Hydration tips?"));
        assert!(prompt.contains("- Current Goals: Run"));
    }
}

#[tokio::test]
async fn empty_tool_request_falls_through_to_commentary() {
    let provider = Arc::new(ScriptedProvider::deciding(vec![Ok(
        Decision::tool_request(Vec::new()).with_commentary("Rest is enough."),
    )]));
    let (orchestrator, mut events) = orchestrator(provider);

    let response = orchestrator
        .answer(QuestionRequest::new("session-4", "Should I rest?"))
        .await;

    assert_eq!(response.answer, "Rest is enough.");
    assert_eq!(response.confidence, 0.8);
    assert!(drain(&mut events).is_empty());
}

#[tokio::test]
async fn provider_failure_degrades_with_one_fatal_event() {
    let provider = Arc::new(ScriptedProvider::deciding(vec![Err(
        ProviderError::authentication("invalid x-api-key"),
    )]));
    let hooks = Arc::new(RecordingHooks::default());
    let (sink, mut events) = ChannelStatusSink::new();
    let orchestrator = Orchestrator::builder(provider, registry())
        .status_sink(Arc::new(sink))
        .hooks(hooks.clone())
        .build();

    let response = orchestrator
        .answer(QuestionRequest::new("session-5", "Anything?"))
        .await;

    assert_eq!(response.answer, DEFAULT_DEGRADED_ANSWER);
    assert!(response.tools_used.is_empty());
    assert_eq!(response.confidence, 0.0);

    let events = drain(&mut events);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, StatusKind::FatalError);
    assert_eq!(events[0].message, "invalid x-api-key");
    assert_eq!(
        hooks.events.lock().expect("events lock").clone(),
        vec!["start", "failure:Provider"]
    );
}

#[tokio::test]
async fn duplicate_call_ids_are_fatal_to_the_round() {
    let provider = Arc::new(
        ScriptedProvider::deciding(vec![Ok(Decision::tool_request(vec![
            ToolCall::from_value("same", "search_web", json!({"query": "a"})),
            ToolCall::from_value("same", "search_web", json!({"query": "b"})),
        ]))])
        .finalizing("unused"),
    );
    let (orchestrator, mut events) = orchestrator(provider);

    let response = orchestrator
        .answer(QuestionRequest::new("session-6", "Duplicate?"))
        .await;

    assert_eq!(response.confidence, 0.0);
    assert!(response.tools_used.is_empty());
    let events = drain(&mut events);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, StatusKind::FatalError);
    assert!(events[0].message.contains("duplicate tool call id"));
}

#[tokio::test]
async fn blank_questions_are_rejected_without_calling_the_provider() {
    let provider = Arc::new(ScriptedProvider::default());
    let (orchestrator, mut events) = orchestrator(Arc::clone(&provider));

    let response = orchestrator
        .answer(QuestionRequest::new("session-7", "   "))
        .await;

    assert_eq!(response.confidence, 0.0);
    assert!(provider.seen.lock().expect("seen lock").is_empty());
    assert_eq!(drain(&mut events)[0].kind, StatusKind::FatalError);
    assert_eq!(
        OrchestratorError::invalid_request("x").kind,
        OrchestratorErrorKind::InvalidRequest
    );
}

#[tokio::test]
async fn chained_rounds_respect_the_round_cap() {
    let provider = Arc::new(
        ScriptedProvider::deciding(vec![
            Ok(Decision::tool_request(vec![ToolCall::from_value(
                "r1",
                "analyze_user_health_data",
                json!({"user_id": 7, "data_types": ["goals"]}),
            )])),
            Ok(Decision::tool_request(vec![ToolCall::from_value(
                "r2",
                "search_web",
                json!({"query": "goal setting"}),
            )])),
        ])
        .finalizing("Set smaller weekly goals."),
    );
    let hooks = Arc::new(RecordingHooks::default());
    let (sink, mut events) = ChannelStatusSink::new();
    let orchestrator = Orchestrator::builder(provider.clone(), registry())
        .status_sink(Arc::new(sink))
        .hooks(hooks.clone())
        .policy(OrchestratorPolicy::default().with_max_tool_rounds(2))
        .build();

    let response = orchestrator
        .answer(QuestionRequest::new("session-8", "Help with my goals"))
        .await;

    assert_eq!(response.answer, "Set smaller weekly goals.");
    assert_eq!(response.rounds, 2);
    assert_eq!(
        response.tools_used,
        vec!["analyze_user_health_data", "search_web"]
    );
    assert_eq!(response.confidence, 1.0);
    assert_eq!(drain(&mut events).len(), 4);
    assert_eq!(provider.seen.lock().expect("seen lock").len(), 3);
    assert_eq!(
        hooks.events.lock().expect("events lock").clone(),
        vec!["start", "dispatch:1:1", "dispatch:2:1", "success:2"]
    );
}

#[tokio::test]
async fn tool_deadlines_come_from_the_policy() {
    let mut slow = ToolRegistry::new();
    slow.register(BuiltinTool::SearchWeb.with_handler(|_args, _ctx| async move {
        Delay::new(Duration::from_millis(500)).await;
        Ok(json!("late"))
    }))
    .expect("slow search registers");
    let provider = Arc::new(
        ScriptedProvider::deciding(vec![Ok(Decision::tool_request(vec![
            ToolCall::from_value("s", "search_web", json!({"query": "anything"})),
        ]))])
        .finalizing("Partial answer."),
    );
    let (sink, mut events) = ChannelStatusSink::new();
    let orchestrator = Orchestrator::builder(provider, Arc::new(slow))
        .status_sink(Arc::new(sink))
        .policy(OrchestratorPolicy::default().with_tool_timeout(Some(Duration::from_millis(20))))
        .build();

    let response = orchestrator
        .answer(QuestionRequest::new("session-9", "Quick?"))
        .await;

    assert_eq!(response.answer, "Partial answer.");
    assert_eq!(response.confidence, 0.0);
    let events = drain(&mut events);
    assert_eq!(events[1].kind, StatusKind::ToolError);
    assert!(events[1].message.contains("deadline"));
}

#[tokio::test]
async fn synchronous_tool_panic_settles_alone() {
    let mut registry = ToolRegistry::new();
    registry
        .register(BuiltinTool::SearchWeb.with_handler(|_args, _ctx| async move {
            Ok(json!({"results": ["hydration basics"]}))
        }))
        .expect("search registers");
    registry
        .register_sync_fn(ToolSchema::new("sync_panics", "Panics on entry"), |_, _| {
            panic!("sync boom")
        })
        .expect("sync_panics registers");
    let provider = Arc::new(
        ScriptedProvider::deciding(vec![Ok(Decision::tool_request(vec![
            ToolCall::from_value("h", "search_web", json!({"query": "water"})),
            ToolCall::from_value("p", "sync_panics", json!({})),
        ]))])
        .finalizing("Drink water through the day."),
    );
    let (sink, mut events) = ChannelStatusSink::new();
    let orchestrator = Orchestrator::builder(provider, Arc::new(registry))
        .status_sink(Arc::new(sink))
        .build();

    let response = tokio::spawn(async move {
        orchestrator
            .answer(QuestionRequest::new("session-10", "How much water?"))
            .await
    })
    .await
    .expect("answer should not panic");

    assert_eq!(response.answer, "Drink water through the day.");
    assert_eq!(response.tools_used, vec!["search_web", "sync_panics"]);
    assert_eq!(response.confidence, 0.5);

    let events = drain(&mut events);
    assert_eq!(events.len(), 4);
    assert!(events[..2].iter().all(|event| event.kind == StatusKind::ToolStarted));
    let failed = events[2..]
        .iter()
        .find(|event| event.tool_name.as_deref() == Some("sync_panics"))
        .expect("terminal event for the panicking call");
    assert_eq!(failed.kind, StatusKind::ToolError);
    assert!(failed.message.contains("sync boom"));
    assert!(
        events[2..]
            .iter()
            .any(|event| event.kind == StatusKind::ToolCompleted
                && event.tool_name.as_deref() == Some("search_web"))
    );
}

//! Round driver: decide, dispatch, feed results back, finalize.
//!
//! [`Orchestrator::answer`] never fails. Provider failures and malformed decisions
//! publish one fatal status event and degrade into the policy's fixed answer with
//! zero confidence.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pprovider::{CompletionProvider, Decision, ToolCall, ToolResult, Transcript};
use ptooling::{
    DefaultToolRuntime, NoopToolRuntimeHooks, ToolExecutionContext, ToolRegistry, ToolRuntime,
    ToolRuntimeHooks,
};

use crate::{
    AgentResponse, DEFAULT_SYSTEM_PROMPT, NoopOrchestratorHooks, NoopStatusSink,
    OrchestratorError, OrchestratorHooks, QuestionRequest, StatusEvent, StatusSink,
    build_context_prompt, confidence, dispatch_calls, new_response_id,
};

pub const DEFAULT_DEGRADED_ANSWER: &str =
    "I'm sorry, I encountered an error while processing your question. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorPolicy {
    /// Dispatch rounds before the provider is asked to finalize. Never below one.
    pub max_tool_rounds: usize,
    pub tool_timeout: Option<Duration>,
    pub system_prompt: String,
    pub degraded_answer: String,
}

impl Default for OrchestratorPolicy {
    fn default() -> Self {
        Self {
            max_tool_rounds: 1,
            tool_timeout: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            degraded_answer: DEFAULT_DEGRADED_ANSWER.to_string(),
        }
    }
}

impl OrchestratorPolicy {
    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds.max(1);
        self
    }

    pub fn with_tool_timeout(mut self, tool_timeout: Option<Duration>) -> Self {
        self.tool_timeout = tool_timeout;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_degraded_answer(mut self, degraded_answer: impl Into<String>) -> Self {
        self.degraded_answer = degraded_answer.into();
        self
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    provider: Arc<dyn CompletionProvider>,
    registry: Arc<ToolRegistry>,
    runtime: Arc<dyn ToolRuntime>,
    sink: Arc<dyn StatusSink>,
    hooks: Arc<dyn OrchestratorHooks>,
    policy: OrchestratorPolicy,
}

impl Orchestrator {
    pub fn builder(
        provider: Arc<dyn CompletionProvider>,
        registry: Arc<ToolRegistry>,
    ) -> OrchestratorBuilder {
        OrchestratorBuilder::new(provider, registry)
    }

    /// Same engine, different sink. Sessions bind their own sink this way.
    pub fn with_status_sink(&self, sink: Arc<dyn StatusSink>) -> Self {
        Self {
            sink,
            ..self.clone()
        }
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn policy(&self) -> &OrchestratorPolicy {
        &self.policy
    }

    pub async fn answer(&self, request: QuestionRequest) -> AgentResponse {
        let response_id = new_response_id();
        let session_id = request.session_id.clone();
        let started = Instant::now();
        self.hooks.on_round_start(&session_id, &response_id);

        match self.run_round(request, &response_id).await {
            Ok(mut response) => {
                response.elapsed = started.elapsed();
                self.hooks.on_round_success(
                    &session_id,
                    &response_id,
                    response.rounds,
                    response.elapsed,
                );
                response
            }
            Err(error) => {
                let elapsed = started.elapsed();
                self.hooks
                    .on_round_failure(&session_id, &response_id, &error, elapsed);
                self.sink.publish(StatusEvent::fatal_error(error.message.clone()));
                AgentResponse::degraded(self.policy.degraded_answer.clone(), response_id, elapsed)
            }
        }
    }

    async fn run_round(
        &self,
        request: QuestionRequest,
        response_id: &str,
    ) -> Result<AgentResponse, OrchestratorError> {
        let QuestionRequest {
            session_id,
            question,
            user_context,
            history,
            trace_id,
            ..
        } = request;

        let question = question.trim();
        if question.is_empty() {
            return Err(OrchestratorError::invalid_request(
                "question must not be empty",
            ));
        }

        let schemas = self.registry.schemas();
        let mut transcript = Transcript::new();
        if !self.policy.system_prompt.trim().is_empty() {
            transcript.push_system(self.policy.system_prompt.clone());
        }
        for turn in history {
            transcript.push(turn);
        }
        transcript.push_user(build_context_prompt(
            question,
            user_context.as_ref(),
            &schemas,
        ));

        let mut context = ToolExecutionContext::new(session_id.clone())
            .with_metadata("response_id", response_id);
        context.trace_id = trace_id;

        let max_rounds = self.policy.max_tool_rounds.max(1);
        let mut rounds = 0;
        let mut tools_used = Vec::new();
        let mut reasoning_steps = Vec::new();
        let mut results: Vec<ToolResult> = Vec::new();
        let mut decision = self.provider.decide(&transcript, &schemas).await?;

        let answer = loop {
            match decision {
                Decision::DirectAnswer { text, .. } => break text,
                Decision::ToolRequest {
                    calls, commentary, ..
                } if calls.is_empty() => break commentary.join("\n"),
                Decision::ToolRequest {
                    calls, commentary, ..
                } => {
                    validate_calls(&calls)?;
                    rounds += 1;
                    self.hooks.on_dispatch(&session_id, rounds, calls.len());

                    tools_used.extend(calls.iter().map(|call| call.name.clone()));
                    reasoning_steps.extend(
                        commentary
                            .iter()
                            .filter(|text| !text.trim().is_empty())
                            .cloned(),
                    );
                    transcript.push_tool_use(commentary, calls.clone());

                    let settled =
                        dispatch_calls(self.runtime.as_ref(), self.sink.as_ref(), calls, &context)
                            .await;
                    let round_results = settled
                        .into_iter()
                        .map(|result| result.into_tool_result())
                        .collect::<Vec<_>>();
                    results.extend(round_results.iter().cloned());
                    transcript.push_tool_results(round_results);

                    if rounds < max_rounds {
                        decision = self.provider.decide(&transcript, &schemas).await?;
                    } else {
                        break self.provider.finalize(&transcript, &schemas).await?;
                    }
                }
            }
        };

        Ok(AgentResponse {
            answer,
            tools_used,
            confidence: confidence(&results),
            reasoning_steps,
            response_id: response_id.to_string(),
            rounds,
            elapsed: Duration::ZERO,
        })
    }
}

fn validate_calls(calls: &[ToolCall]) -> Result<(), OrchestratorError> {
    let mut seen = HashSet::with_capacity(calls.len());
    for call in calls {
        if call.id.trim().is_empty() {
            return Err(OrchestratorError::malformed_decision(
                "tool call is missing an id",
            ));
        }
        if call.name.trim().is_empty() {
            return Err(OrchestratorError::malformed_decision(format!(
                "tool call '{}' is missing a tool name",
                call.id
            )));
        }
        if !seen.insert(call.id.as_str()) {
            return Err(OrchestratorError::malformed_decision(format!(
                "duplicate tool call id '{}'",
                call.id
            )));
        }
    }

    Ok(())
}

pub struct OrchestratorBuilder {
    provider: Arc<dyn CompletionProvider>,
    registry: Arc<ToolRegistry>,
    sink: Arc<dyn StatusSink>,
    hooks: Arc<dyn OrchestratorHooks>,
    tool_hooks: Arc<dyn ToolRuntimeHooks>,
    tool_runtime: Option<Arc<dyn ToolRuntime>>,
    policy: OrchestratorPolicy,
}

impl OrchestratorBuilder {
    pub fn new(provider: Arc<dyn CompletionProvider>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            registry,
            sink: Arc::new(NoopStatusSink),
            hooks: Arc::new(NoopOrchestratorHooks),
            tool_hooks: Arc::new(NoopToolRuntimeHooks),
            tool_runtime: None,
            policy: OrchestratorPolicy::default(),
        }
    }

    pub fn status_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn OrchestratorHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Ignored when a custom runtime is supplied.
    pub fn tool_hooks(mut self, tool_hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.tool_hooks = tool_hooks;
        self
    }

    pub fn tool_runtime(mut self, tool_runtime: Arc<dyn ToolRuntime>) -> Self {
        self.tool_runtime = Some(tool_runtime);
        self
    }

    pub fn policy(mut self, policy: OrchestratorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Orchestrator {
        let runtime = self.tool_runtime.unwrap_or_else(|| {
            Arc::new(
                DefaultToolRuntime::new(Arc::clone(&self.registry))
                    .with_hooks(self.tool_hooks)
                    .with_timeout(self.policy.tool_timeout),
            )
        });

        Orchestrator {
            provider: self.provider,
            registry: self.registry,
            runtime,
            sink: self.sink,
            hooks: self.hooks,
            policy: self.policy,
        }
    }
}

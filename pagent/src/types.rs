//! Round request and response types.

use std::time::Duration;

use pcommon::{ConversationId, SessionId, TraceId};
use pprovider::Turn;
use uuid::Uuid;

use crate::UserContext;

/// One user question plus everything the orchestrator needs to answer it.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRequest {
    pub session_id: SessionId,
    pub question: String,
    pub conversation_id: Option<ConversationId>,
    pub user_context: Option<UserContext>,
    pub history: Vec<Turn>,
    pub trace_id: Option<TraceId>,
}

impl QuestionRequest {
    pub fn new(session_id: impl Into<SessionId>, question: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            question: question.into(),
            conversation_id: None,
            user_context: None,
            history: Vec::new(),
            trace_id: None,
        }
    }

    pub fn with_conversation_id(mut self, conversation_id: impl Into<ConversationId>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_user_context(mut self, user_context: UserContext) -> Self {
        self.user_context = Some(user_context);
        self
    }

    pub fn with_history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

/// Exactly one of these is produced per round, successful or not.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentResponse {
    pub answer: String,
    /// Names of provider-issued calls, in issue order.
    pub tools_used: Vec<String>,
    pub confidence: f64,
    pub reasoning_steps: Vec<String>,
    pub response_id: String,
    /// Dispatch rounds performed.
    pub rounds: usize,
    pub elapsed: Duration,
}

impl AgentResponse {
    pub fn degraded(answer: impl Into<String>, response_id: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            answer: answer.into(),
            tools_used: Vec::new(),
            confidence: 0.0,
            reasoning_steps: Vec::new(),
            response_id: response_id.into(),
            rounds: 0,
            elapsed,
        }
    }
}

pub fn new_response_id() -> String {
    Uuid::new_v4().to_string()
}

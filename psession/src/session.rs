//! Per-client session state machine.
//!
//! A session owns one orchestrator bound to its [`SessionSink`] and processes inbound
//! frames strictly in order. Each round runs in its own task so in-flight tool calls
//! finish even when the client disconnects; anything they emit after close is dropped.

use std::sync::Arc;

use pagent::{
    AgentResponse, ConversationStore, NewMessage, Orchestrator, QuestionRequest, StatusEvent,
    StatusSink, UserContext,
};
use pcommon::{ConversationId, SessionId};
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use crate::{ClientMessage, ServerMessage, SessionError, SessionSink, decode_client_message};

pub const CONNECTED_MESSAGE: &str = "Connected to AI Assistant";
pub const THINKING_MESSAGE: &str = "AI is analyzing your question...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Connected,
    Processing,
    Idle,
    Closed,
}

pub struct Session {
    id: SessionId,
    user_id: Option<String>,
    orchestrator: Orchestrator,
    store: Arc<dyn ConversationStore>,
    sink: SessionSink,
    state: SessionState,
    conversation_id: Option<ConversationId>,
}

impl Session {
    pub fn new(
        id: impl Into<SessionId>,
        orchestrator: &Orchestrator,
        store: Arc<dyn ConversationStore>,
        sink: SessionSink,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: None,
            orchestrator: orchestrator.with_status_sink(Arc::new(sink.clone())),
            store,
            sink,
            state: SessionState::Connected,
            conversation_id: None,
        }
    }

    /// Authenticated user whose stored context enriches prompts.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn conversation_id(&self) -> Option<&ConversationId> {
        self.conversation_id.as_ref()
    }

    /// Handle that silences the session from outside, e.g. when the socket drops.
    pub fn sink(&self) -> SessionSink {
        self.sink.clone()
    }

    pub fn open(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.deliver(ServerMessage::ConnectionEstablished {
            message: CONNECTED_MESSAGE.to_string(),
        });
        Ok(())
    }

    pub fn close(&mut self) {
        if self.state != SessionState::Closed {
            tracing::debug!(session_id = %self.id, "session closed");
        }
        self.state = SessionState::Closed;
        self.sink.close();
    }

    /// Decodes and handles one raw text frame. Undecodable frames are reported to the
    /// client and leave the state untouched.
    pub async fn handle_frame(&mut self, text: &str) -> Result<(), SessionError> {
        self.ensure_open()?;
        match decode_client_message(text) {
            Ok(message) => self.handle(message).await,
            Err(error) => {
                tracing::debug!(session_id = %self.id, error = %error, "undecodable client frame");
                self.deliver(ServerMessage::system_error(format!(
                    "Error processing message: {}",
                    error.message
                )));
                Ok(())
            }
        }
    }

    pub async fn handle(&mut self, message: ClientMessage) -> Result<(), SessionError> {
        self.ensure_open()?;
        match message {
            ClientMessage::UserMessage {
                message,
                conversation_id,
            } => {
                self.handle_user_message(message, conversation_id).await;
                Ok(())
            }
            ClientMessage::Ping => {
                self.deliver(ServerMessage::Pong);
                Ok(())
            }
            ClientMessage::Unknown => {
                tracing::debug!(session_id = %self.id, "ignoring unknown client frame type");
                Ok(())
            }
        }
    }

    /// Sends `connection_established`, then handles frames until the inbound queue
    /// closes.
    pub async fn run(mut self, mut inbound: UnboundedReceiver<String>) {
        if self.open().is_err() {
            return;
        }

        while let Some(frame) = inbound.recv().await {
            if let Err(error) = self.handle_frame(&frame).await {
                tracing::debug!(session_id = %self.id, error = %error, "session stopped");
                break;
            }
        }

        self.close();
    }

    async fn handle_user_message(&mut self, message: String, conversation_id: Option<String>) {
        if message.trim().is_empty() {
            return;
        }

        let conversation_id = self.resolve_conversation(conversation_id);
        self.persist(&conversation_id, NewMessage::user(message.clone()))
            .await;

        self.state = SessionState::Processing;
        self.sink
            .publish(StatusEvent::thinking_started(THINKING_MESSAGE));

        let user_context = self.load_user_context().await;
        let mut request = QuestionRequest::new(self.id.clone(), message)
            .with_conversation_id(conversation_id.clone());
        if let Some(context) = user_context {
            request = request.with_user_context(context);
        }

        let orchestrator = self.orchestrator.clone();
        let round = tokio::spawn(async move { orchestrator.answer(request).await });
        let outcome = round.await;

        self.sink.publish(StatusEvent::thinking_stopped(""));
        match outcome {
            Ok(response) => {
                self.deliver(ServerMessage::assistant_response(&response));
                self.persist(&conversation_id, assistant_message(&response))
                    .await;
            }
            Err(error) => {
                tracing::error!(session_id = %self.id, error = %error, "round task failed");
                self.deliver(ServerMessage::system_error(format!(
                    "Sorry, I encountered an error: {error}"
                )));
            }
        }

        self.state = if self.sink.is_closed() {
            SessionState::Closed
        } else {
            SessionState::Idle
        };
    }

    fn resolve_conversation(&mut self, supplied: Option<String>) -> ConversationId {
        let supplied = supplied.filter(|id| !id.trim().is_empty());
        let conversation_id = match (supplied, &self.conversation_id) {
            (Some(id), _) => ConversationId::new(id),
            (None, Some(remembered)) => remembered.clone(),
            (None, None) => {
                let generated = ConversationId::new(Uuid::new_v4().to_string());
                self.deliver(ServerMessage::ConversationId {
                    conversation_id: generated.to_string(),
                });
                generated
            }
        };

        self.conversation_id = Some(conversation_id.clone());
        conversation_id
    }

    async fn load_user_context(&self) -> Option<UserContext> {
        let user_id = self.user_id.as_deref()?;
        match self.store.user_context(user_id).await {
            Ok(context) => context,
            Err(error) => {
                tracing::warn!(session_id = %self.id, user_id, error = %error, "failed to load user context");
                None
            }
        }
    }

    async fn persist(&self, conversation_id: &ConversationId, message: NewMessage) {
        if let Err(error) = self.store.append(conversation_id, message).await {
            tracing::warn!(
                session_id = %self.id,
                conversation_id = %conversation_id,
                error = %error,
                "failed to persist message"
            );
        }
    }

    fn deliver(&self, message: ServerMessage) {
        if !self.sink.send(message) {
            tracing::trace!(session_id = %self.id, "dropped frame for closed session");
        }
    }

    fn ensure_open(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Closed || self.sink.is_closed() {
            self.state = SessionState::Closed;
            return Err(SessionError::closed(format!(
                "session '{}' is closed",
                self.id
            )));
        }
        Ok(())
    }
}

fn assistant_message(response: &AgentResponse) -> NewMessage {
    NewMessage::assistant(response.answer.clone())
        .with_id(response.response_id.clone())
        .with_tools_used(response.tools_used.clone())
        .with_confidence(response.confidence)
}

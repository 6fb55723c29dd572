//! Conversation storage contracts and a basic in-memory implementation.
//!
//! The orchestrator never consults the store for routing decisions; sessions append
//! messages around each round and load [`UserContext`] to enrich the prompt.
//!
//! ```rust
//! use pagent::{ConversationStore, InMemoryConversationStore, NewMessage, Sender};
//! use pcommon::ConversationId;
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().expect("runtime");
//! let store = InMemoryConversationStore::new();
//! let conversation = ConversationId::new("c-1");
//!
//! let stored = rt
//!     .block_on(store.append(&conversation, NewMessage::user("How do I sleep better?")))
//!     .expect("append succeeds");
//! assert_eq!(stored.sender, Sender::User);
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::SystemTime;

use pcommon::{BoxFuture, ConversationId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::StoreError;

pub type StoreFuture<'a, T> = BoxFuture<'a, T>;

pub trait ConversationStore: Send + Sync {
    /// Creates the conversation on first append.
    fn append<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        message: NewMessage,
    ) -> StoreFuture<'a, Result<StoredMessage, StoreError>>;

    fn messages<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> StoreFuture<'a, Result<Vec<StoredMessage>, StoreError>>;

    fn user_context<'a>(
        &'a self,
        user_id: &'a str,
    ) -> StoreFuture<'a, Result<Option<UserContext>, StoreError>>;

    fn record_feedback<'a>(&'a self, feedback: Feedback) -> StoreFuture<'a, Result<(), StoreError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub id: Option<String>,
    pub sender: Sender,
    pub content: String,
    pub tools_used: Vec<String>,
    pub confidence: Option<f64>,
}

impl NewMessage {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: None,
            sender,
            content: content.into(),
            tools_used: Vec::new(),
            confidence: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, content)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_tools_used(mut self, tools_used: Vec<String>) -> Self {
        self.tools_used = tools_used;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub id: String,
    pub conversation_id: ConversationId,
    pub sender: Sender,
    pub content: String,
    pub tools_used: Vec<String>,
    pub confidence: Option<f64>,
    pub created_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub message_id: String,
    pub rating: u8,
    pub comment: Option<String>,
}

impl Feedback {
    pub fn new(message_id: impl Into<String>, rating: u8) -> Self {
        Self {
            message_id: message_id.into(),
            rating,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Facts about a user rendered into the prompt, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
    pub display_name: Option<String>,
    pub facts: Vec<(String, String)>,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_fact(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.facts.push((label.into(), value.into()));
        self
    }
}

#[derive(Debug, Default)]
struct StoreState {
    conversations: HashMap<ConversationId, Vec<StoredMessage>>,
    message_senders: HashMap<String, Sender>,
    feedback: HashMap<String, Feedback>,
    user_contexts: HashMap<String, UserContext>,
}

#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    state: Mutex<StoreState>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_context(self, context: UserContext) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state
                .user_contexts
                .insert(context.user_id.clone(), context);
        }
        self
    }

    pub fn feedback(&self, message_id: &str) -> Result<Option<Feedback>, StoreError> {
        let state = self.lock()?;
        Ok(state.feedback.get(message_id).cloned())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::backend("conversation store lock poisoned"))
    }
}

impl ConversationStore for InMemoryConversationStore {
    fn append<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        message: NewMessage,
    ) -> StoreFuture<'a, Result<StoredMessage, StoreError>> {
        Box::pin(async move {
            let mut state = self.lock()?;
            let id = message
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            if state.message_senders.contains_key(&id) {
                return Err(StoreError::conflict(format!(
                    "message '{id}' already exists"
                )));
            }

            let stored = StoredMessage {
                id: id.clone(),
                conversation_id: conversation_id.clone(),
                sender: message.sender,
                content: message.content,
                tools_used: message.tools_used,
                confidence: message.confidence,
                created_at: SystemTime::now(),
            };

            state.message_senders.insert(id, stored.sender);
            state
                .conversations
                .entry(conversation_id.clone())
                .or_default()
                .push(stored.clone());

            Ok(stored)
        })
    }

    fn messages<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> StoreFuture<'a, Result<Vec<StoredMessage>, StoreError>> {
        Box::pin(async move {
            let state = self.lock()?;
            Ok(state
                .conversations
                .get(conversation_id)
                .cloned()
                .unwrap_or_default())
        })
    }

    fn user_context<'a>(
        &'a self,
        user_id: &'a str,
    ) -> StoreFuture<'a, Result<Option<UserContext>, StoreError>> {
        Box::pin(async move {
            let state = self.lock()?;
            Ok(state.user_contexts.get(user_id).cloned())
        })
    }

    fn record_feedback<'a>(&'a self, feedback: Feedback) -> StoreFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            if !(1..=5).contains(&feedback.rating) {
                return Err(StoreError::invalid_feedback(format!(
                    "rating must be between 1 and 5, got {}",
                    feedback.rating
                )));
            }

            let mut state = self.lock()?;
            let sender = match state.message_senders.get(&feedback.message_id) {
                Some(sender) => *sender,
                None => {
                    return Err(StoreError::not_found(format!(
                        "message '{}' not found",
                        feedback.message_id
                    )));
                }
            };
            if sender != Sender::Assistant {
                return Err(StoreError::invalid_feedback(
                    "feedback can only be recorded for assistant messages",
                ));
            }
            if state.feedback.contains_key(&feedback.message_id) {
                return Err(StoreError::conflict(format!(
                    "feedback already recorded for message '{}'",
                    feedback.message_id
                )));
            }

            state
                .feedback
                .insert(feedback.message_id.clone(), feedback);
            Ok(())
        })
    }
}

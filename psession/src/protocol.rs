//! JSON frames exchanged with a connected client.
//!
//! ```rust
//! use psession::{ClientMessage, ServerMessage, decode_client_message};
//!
//! let frame = decode_client_message(r#"{"type":"ping"}"#).expect("valid frame");
//! assert_eq!(frame, ClientMessage::Ping);
//!
//! let pong = serde_json::to_string(&ServerMessage::Pong).expect("serializes");
//! assert_eq!(pong, r#"{"type":"pong"}"#);
//! ```

use pagent::{AgentResponse, StatusEvent, StatusKind};
use pcommon::unix_seconds;
use serde::{Deserialize, Serialize};

use crate::SessionError;

/// Tool name reported on events that do not belong to a tool.
pub const SYSTEM_TOOL_NAME: &str = "system";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    UserMessage {
        #[serde(default)]
        message: String,
        #[serde(default)]
        conversation_id: Option<String>,
    },
    Ping,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ConnectionEstablished {
        message: String,
    },
    ConversationId {
        conversation_id: String,
    },
    ThinkingStarted {
        tool_name: String,
        message: String,
    },
    ThinkingStopped {
        tool_name: String,
        message: String,
    },
    ToolStarted {
        tool_name: String,
        message: String,
        timestamp: f64,
    },
    ToolCompleted {
        tool_name: String,
        message: String,
        timestamp: f64,
    },
    ToolError {
        tool_name: String,
        message: String,
        timestamp: f64,
    },
    AssistantResponse {
        message: String,
        tools_used: Vec<String>,
        confidence: f64,
        message_id: String,
    },
    Pong,
    Error {
        tool_name: String,
        message: String,
    },
}

impl ServerMessage {
    pub fn system_error(message: impl Into<String>) -> Self {
        Self::Error {
            tool_name: SYSTEM_TOOL_NAME.to_string(),
            message: message.into(),
        }
    }

    pub fn assistant_response(response: &AgentResponse) -> Self {
        Self::AssistantResponse {
            message: response.answer.clone(),
            tools_used: response.tools_used.clone(),
            confidence: response.confidence,
            message_id: response.response_id.clone(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ConnectionEstablished { .. } => "connection_established",
            Self::ConversationId { .. } => "conversation_id",
            Self::ThinkingStarted { .. } => "thinking_started",
            Self::ThinkingStopped { .. } => "thinking_stopped",
            Self::ToolStarted { .. } => "tool_started",
            Self::ToolCompleted { .. } => "tool_completed",
            Self::ToolError { .. } => "tool_error",
            Self::AssistantResponse { .. } => "assistant_response",
            Self::Pong => "pong",
            Self::Error { .. } => "error",
        }
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        serde_json::to_string(self)
            .map_err(|error| SessionError::protocol(format!("failed to encode frame: {error}")))
    }
}

impl From<&StatusEvent> for ServerMessage {
    fn from(event: &StatusEvent) -> Self {
        let tool_name = event
            .tool_name
            .clone()
            .unwrap_or_else(|| SYSTEM_TOOL_NAME.to_string());
        let message = event.message.clone();
        let timestamp = unix_seconds(event.timestamp);

        match event.kind {
            StatusKind::ThinkingStarted => Self::ThinkingStarted { tool_name, message },
            StatusKind::ThinkingStopped => Self::ThinkingStopped { tool_name, message },
            StatusKind::ToolStarted => Self::ToolStarted {
                tool_name,
                message,
                timestamp,
            },
            StatusKind::ToolCompleted => Self::ToolCompleted {
                tool_name,
                message,
                timestamp,
            },
            StatusKind::ToolError => Self::ToolError {
                tool_name,
                message,
                timestamp,
            },
            StatusKind::FatalError => Self::system_error(message),
        }
    }
}

pub fn decode_client_message(text: &str) -> Result<ClientMessage, SessionError> {
    serde_json::from_str(text).map_err(|error| SessionError::protocol(error.to_string()))
}

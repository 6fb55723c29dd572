//! Lifecycle status events and the sink contract they are published through.
//!
//! ```rust
//! use pagent::{ChannelStatusSink, StatusEvent, StatusKind, StatusSink};
//!
//! let (sink, mut events) = ChannelStatusSink::new();
//! sink.publish(StatusEvent::tool_started("search_web", "Searching the web for: sleep"));
//!
//! let event = events.try_recv().expect("event should be queued");
//! assert_eq!(event.kind, StatusKind::ToolStarted);
//! assert_eq!(event.tool_name.as_deref(), Some("search_web"));
//! ```

use std::time::SystemTime;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    ThinkingStarted,
    ThinkingStopped,
    ToolStarted,
    ToolCompleted,
    ToolError,
    FatalError,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThinkingStarted => "thinking_started",
            Self::ThinkingStopped => "thinking_stopped",
            Self::ToolStarted => "tool_started",
            Self::ToolCompleted => "tool_completed",
            Self::ToolError => "tool_error",
            Self::FatalError => "error",
        }
    }

    pub fn is_terminal_tool_event(self) -> bool {
        matches!(self, Self::ToolCompleted | Self::ToolError)
    }
}

/// `tool_name` is `None` for system-level events.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEvent {
    pub kind: StatusKind,
    pub tool_name: Option<String>,
    pub message: String,
    pub timestamp: SystemTime,
}

impl StatusEvent {
    pub fn new(kind: StatusKind, tool_name: Option<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            tool_name,
            message: message.into(),
            timestamp: SystemTime::now(),
        }
    }

    pub fn thinking_started(message: impl Into<String>) -> Self {
        Self::new(StatusKind::ThinkingStarted, None, message)
    }

    pub fn thinking_stopped(message: impl Into<String>) -> Self {
        Self::new(StatusKind::ThinkingStopped, None, message)
    }

    pub fn tool_started(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusKind::ToolStarted, Some(tool_name.into()), message)
    }

    pub fn tool_completed(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusKind::ToolCompleted, Some(tool_name.into()), message)
    }

    pub fn tool_error(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusKind::ToolError, Some(tool_name.into()), message)
    }

    pub fn fatal_error(message: impl Into<String>) -> Self {
        Self::new(StatusKind::FatalError, None, message)
    }
}

/// Fire-and-forget, order-preserving event sink owned by one session.
pub trait StatusSink: Send + Sync {
    fn publish(&self, event: StatusEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStatusSink;

impl StatusSink for NoopStatusSink {
    fn publish(&self, _event: StatusEvent) {}
}

/// Forwards events into an unbounded tokio channel; a closed receiver drops events.
#[derive(Debug, Clone)]
pub struct ChannelStatusSink {
    sender: UnboundedSender<StatusEvent>,
}

impl ChannelStatusSink {
    pub fn new() -> (Self, UnboundedReceiver<StatusEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl StatusSink for ChannelStatusSink {
    fn publish(&self, event: StatusEvent) {
        let _ = self.sender.send(event);
    }
}

//! Outbound frame sink shared by a session and its orchestrator.
//!
//! ```rust
//! use psession::{ServerMessage, SessionSink};
//!
//! let (sink, mut frames) = SessionSink::channel();
//! assert!(sink.send(ServerMessage::Pong));
//!
//! sink.close();
//! assert!(!sink.send(ServerMessage::Pong));
//! assert_eq!(frames.try_recv().expect("first frame"), ServerMessage::Pong);
//! assert!(frames.try_recv().is_err());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use pagent::{StatusEvent, StatusSink};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::ServerMessage;

/// Clones share the closed flag, so closing any clone silences them all.
#[derive(Debug, Clone)]
pub struct SessionSink {
    outbound: UnboundedSender<ServerMessage>,
    closed: Arc<AtomicBool>,
}

impl SessionSink {
    pub fn new(outbound: UnboundedSender<ServerMessage>) -> Self {
        Self {
            outbound,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn channel() -> (Self, UnboundedReceiver<ServerMessage>) {
        let (outbound, frames) = unbounded_channel();
        (Self::new(outbound), frames)
    }

    /// Returns `false` when the frame was dropped.
    pub fn send(&self, message: ServerMessage) -> bool {
        if self.is_closed() {
            return false;
        }

        if self.outbound.send(message).is_err() {
            self.close();
            return false;
        }

        true
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl StatusSink for SessionSink {
    fn publish(&self, event: StatusEvent) {
        self.send(ServerMessage::from(&event));
    }
}

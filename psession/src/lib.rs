//! Live status streaming sessions for the parley agent gateway.
//!
//! A [`Session`] turns decoded client frames into orchestration rounds and streams
//! every lifecycle event back as a [`ServerMessage`].

mod error;
mod protocol;
mod session;
mod sink;

pub use error::{SessionError, SessionErrorKind};
pub use protocol::{ClientMessage, SYSTEM_TOOL_NAME, ServerMessage, decode_client_message};
pub use session::{CONNECTED_MESSAGE, Session, SessionState, THINKING_MESSAGE};
pub use sink::SessionSink;

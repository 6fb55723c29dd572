//! Runtime hook contracts for observing orchestration rounds.
//!
//! ```rust
//! use pagent::{NoopOrchestratorHooks, OrchestratorHooks};
//!
//! fn accepts_hooks(_hooks: &dyn OrchestratorHooks) {}
//!
//! let hooks = NoopOrchestratorHooks;
//! accepts_hooks(&hooks);
//! ```

use std::time::Duration;

use pcommon::SessionId;

use crate::OrchestratorError;

pub trait OrchestratorHooks: Send + Sync {
    fn on_round_start(&self, _session_id: &SessionId, _response_id: &str) {}

    fn on_dispatch(&self, _session_id: &SessionId, _round: usize, _call_count: usize) {}

    fn on_round_success(
        &self,
        _session_id: &SessionId,
        _response_id: &str,
        _rounds: usize,
        _elapsed: Duration,
    ) {
    }

    fn on_round_failure(
        &self,
        _session_id: &SessionId,
        _response_id: &str,
        _error: &OrchestratorError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOrchestratorHooks;

impl OrchestratorHooks for NoopOrchestratorHooks {}

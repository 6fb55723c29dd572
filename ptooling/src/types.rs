//! Tool runtime context and execution result types.

use std::time::{Duration, SystemTime};

use pcommon::{MetadataMap, SessionId, TraceId, elapsed_between};
use pprovider::{ToolCall, ToolOutcome, ToolResult};
use serde_json::Value;

use crate::ToolError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExecutionContext {
    pub session_id: SessionId,
    pub trace_id: Option<TraceId>,
    pub metadata: MetadataMap,
}

impl ToolExecutionContext {
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
            trace_id: None,
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// One settled call. `summary` is the success summary or the failure description.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExecutionResult {
    pub call: ToolCall,
    pub outcome: Result<Value, ToolError>,
    pub summary: String,
    pub started_at: SystemTime,
    pub completed_at: SystemTime,
}

impl ToolExecutionResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn elapsed(&self) -> Duration {
        elapsed_between(self.started_at, self.completed_at)
    }

    pub fn into_tool_result(self) -> ToolResult {
        let outcome = match self.outcome {
            Ok(value) => ToolOutcome::Success(value),
            Err(error) => ToolOutcome::Failure(error.message),
        };

        ToolResult::new(&self.call, outcome, self.started_at, self.completed_at)
    }
}

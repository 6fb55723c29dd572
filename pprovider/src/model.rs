//! Provider-agnostic transcript, decision, and tool-call model types.
//!
//! ```rust
//! use pprovider::{Decision, ToolCall, Transcript};
//! use serde_json::Map;
//!
//! let mut transcript = Transcript::new();
//! transcript.push_user("What should I eat after a run?");
//!
//! let decision = Decision::tool_request(vec![ToolCall::new("call_1", "search_web", Map::new())]);
//! assert_eq!(decision.tool_calls().len(), 1);
//! assert_eq!(transcript.len(), 1);
//! ```

use std::time::{Duration, SystemTime};

use pcommon::elapsed_between;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
    StopSequence,
    Cancelled,
    Other,
}

/// One provider-issued request to invoke a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Map<String, Value>,
    pub issued_at: SystemTime,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
            issued_at: SystemTime::now(),
        }
    }

    /// Builds a call from an arbitrary JSON value; non-object input yields no arguments.
    pub fn from_value(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Self::new(id, name, arguments)
    }

    pub fn argument(&self, key: &str) -> Option<&Value> {
        self.arguments.get(key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Success(Value),
    Failure(String),
}

/// Settled outcome of one tool call, correlated by `call_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub call_id: String,
    pub tool_name: String,
    pub outcome: ToolOutcome,
    pub completed_at: SystemTime,
    pub duration: Duration,
}

impl ToolResult {
    pub fn new(
        call: &ToolCall,
        outcome: ToolOutcome,
        started_at: SystemTime,
        completed_at: SystemTime,
    ) -> Self {
        Self {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            outcome,
            completed_at,
            duration: elapsed_between(started_at, completed_at),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Success(_))
    }

    /// Text handed back to the model for this result.
    pub fn content_text(&self) -> String {
        match &self.outcome {
            ToolOutcome::Success(Value::String(text)) => text.clone(),
            ToolOutcome::Success(value) => value.to_string(),
            ToolOutcome::Failure(message) => {
                format!("Error executing {}: {}", self.tool_name, message)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    System(String),
    User(String),
    Assistant(String),
    ToolUse {
        commentary: Vec<String>,
        calls: Vec<ToolCall>,
    },
    ToolResults(Vec<ToolResult>),
}

/// Ordered conversation turns sent to a provider.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn push_system(&mut self, content: impl Into<String>) {
        self.push(Turn::System(content.into()));
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Turn::User(content.into()));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Turn::Assistant(content.into()));
    }

    pub fn push_tool_use(&mut self, commentary: Vec<String>, calls: Vec<ToolCall>) {
        self.push(Turn::ToolUse { commentary, calls });
    }

    pub fn push_tool_results(&mut self, results: Vec<ToolResult>) {
        self.push(Turn::ToolResults(results));
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// All system turns joined in order, if any.
    pub fn system_prompt(&self) -> Option<String> {
        let parts = self
            .turns
            .iter()
            .filter_map(|turn| match turn {
                Turn::System(content) => Some(content.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }

    pub fn has_tool_results(&self) -> bool {
        self.turns
            .iter()
            .any(|turn| matches!(turn, Turn::ToolResults(_)))
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// A provider's answer to `decide`.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    DirectAnswer {
        text: String,
        stop_reason: StopReason,
    },
    ToolRequest {
        calls: Vec<ToolCall>,
        commentary: Vec<String>,
        stop_reason: StopReason,
    },
}

impl Decision {
    pub fn direct(text: impl Into<String>) -> Self {
        Self::DirectAnswer {
            text: text.into(),
            stop_reason: StopReason::EndTurn,
        }
    }

    pub fn tool_request(calls: Vec<ToolCall>) -> Self {
        Self::ToolRequest {
            calls,
            commentary: Vec::new(),
            stop_reason: StopReason::ToolUse,
        }
    }

    pub fn with_commentary(self, text: impl Into<String>) -> Self {
        match self {
            Self::ToolRequest {
                calls,
                mut commentary,
                stop_reason,
            } => {
                commentary.push(text.into());
                Self::ToolRequest {
                    calls,
                    commentary,
                    stop_reason,
                }
            }
            direct => direct,
        }
    }

    pub fn stop_reason(&self) -> StopReason {
        match self {
            Self::DirectAnswer { stop_reason, .. } | Self::ToolRequest { stop_reason, .. } => {
                *stop_reason
            }
        }
    }

    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Self::DirectAnswer { .. } => &[],
            Self::ToolRequest { calls, .. } => calls,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn result_content_text_reports_failures_with_tool_name() {
        let call = ToolCall::new("call_1", "search_web", Map::new());
        let now = SystemTime::now();

        let ok = ToolResult::new(&call, ToolOutcome::Success(json!({"hits": 2})), now, now);
        assert!(ok.is_success());
        assert_eq!(ok.content_text(), "{\"hits\":2}");

        let failed = ToolResult::new(&call, ToolOutcome::Failure("offline".into()), now, now);
        assert!(!failed.is_success());
        assert_eq!(failed.content_text(), "Error executing search_web: offline");
        assert_eq!(failed.call_id, "call_1");
    }

    #[test]
    fn transcript_joins_system_turns() {
        let mut transcript = Transcript::new();
        assert!(transcript.system_prompt().is_none());

        transcript.push_system("be brief");
        transcript.push_user("hi");
        transcript.push_system("cite sources");

        assert_eq!(
            transcript.system_prompt().as_deref(),
            Some("be brief\n\ncite sources")
        );
        assert!(!transcript.has_tool_results());
    }

    #[test]
    fn commentary_only_attaches_to_tool_requests() {
        let direct = Decision::direct("done").with_commentary("ignored");
        assert_eq!(direct, Decision::direct("done"));

        let request = Decision::tool_request(Vec::new()).with_commentary("checking data");
        match request {
            Decision::ToolRequest { commentary, .. } => assert_eq!(commentary, vec!["checking data"]),
            Decision::DirectAnswer { .. } => panic!("expected tool request"),
        }
    }

    #[test]
    fn from_value_drops_non_object_arguments() {
        let call = ToolCall::from_value("c", "t", json!("raw"));
        assert!(call.arguments.is_empty());
        assert_eq!(call.argument("missing"), None);
    }
}

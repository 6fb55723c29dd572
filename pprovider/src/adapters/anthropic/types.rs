//! Anthropic adapter types and provider-agnostic conversion logic.

use serde_json::Value;

use crate::{Decision, ProviderError, StopReason, ToolCall, ToolSchema};

pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

#[derive(Debug, Clone, PartialEq)]
pub struct AnthropicConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
        }
    }
}

impl AnthropicConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.max_tokens == 0 {
            return Err(ProviderError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err(ProviderError::invalid_request(
                    "temperature must be in the inclusive range 0.0..=1.0",
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnthropicRole {
    User,
    Assistant,
}

impl AnthropicRole {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnthropicContent {
    Text(String),
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        is_error: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnthropicMessage {
    pub role: AnthropicRole,
    pub content: Vec<AnthropicContent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnthropicTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl From<&ToolSchema> for AnthropicTool {
    fn from(value: &ToolSchema) -> Self {
        Self {
            name: value.name.clone(),
            description: value.description.clone(),
            input_schema: value.to_json_schema(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnthropicRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub system: Option<String>,
    pub messages: Vec<AnthropicMessage>,
    pub tools: Vec<AnthropicTool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnthropicStopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
    StopSequence,
    Other,
}

impl From<AnthropicStopReason> for StopReason {
    fn from(value: AnthropicStopReason) -> Self {
        match value {
            AnthropicStopReason::EndTurn => Self::EndTurn,
            AnthropicStopReason::MaxTokens => Self::MaxTokens,
            AnthropicStopReason::ToolUse => Self::ToolUse,
            AnthropicStopReason::StopSequence => Self::StopSequence,
            AnthropicStopReason::Other => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnthropicResponse {
    pub model: String,
    pub content: Vec<AnthropicContent>,
    pub stop_reason: AnthropicStopReason,
}

impl AnthropicResponse {
    /// Concatenated text blocks in response order.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                AnthropicContent::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Any `tool_use` block makes this a tool request; remaining text becomes commentary.
    pub fn into_decision(self) -> Decision {
        let stop_reason = StopReason::from(self.stop_reason);
        let mut commentary = Vec::new();
        let mut calls = Vec::new();

        for block in self.content {
            match block {
                AnthropicContent::Text(text) => {
                    if !text.trim().is_empty() {
                        commentary.push(text);
                    }
                }
                AnthropicContent::ToolUse { id, name, input } => {
                    calls.push(ToolCall::from_value(id, name, input));
                }
                AnthropicContent::ToolResult { .. } => {}
            }
        }

        if calls.is_empty() {
            Decision::DirectAnswer {
                text: commentary.join(""),
                stop_reason,
            }
        } else {
            Decision::ToolRequest {
                calls,
                commentary,
                stop_reason,
            }
        }
    }
}

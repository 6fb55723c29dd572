//! Anthropic Messages API payload serde models and conversion helpers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ProviderError;

use super::types::{
    AnthropicContent, AnthropicMessage, AnthropicRequest, AnthropicResponse, AnthropicStopReason,
    AnthropicTool,
};

pub(crate) fn build_api_request(
    request: AnthropicRequest,
) -> Result<AnthropicApiRequest, ProviderError> {
    if request.messages.is_empty() {
        return Err(ProviderError::invalid_request(
            "Anthropic request requires at least one message",
        ));
    }

    let messages = request
        .messages
        .into_iter()
        .map(AnthropicApiMessage::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let tools = if request.tools.is_empty() {
        None
    } else {
        Some(
            request
                .tools
                .into_iter()
                .map(AnthropicApiTool::from)
                .collect::<Vec<_>>(),
        )
    };

    Ok(AnthropicApiRequest {
        model: request.model,
        max_tokens: request.max_tokens,
        system: request.system,
        messages,
        tools,
        temperature: request.temperature,
    })
}

pub(crate) fn parse_stop_reason(value: Option<&str>) -> AnthropicStopReason {
    match value {
        Some("end_turn") => AnthropicStopReason::EndTurn,
        Some("max_tokens") => AnthropicStopReason::MaxTokens,
        Some("tool_use") => AnthropicStopReason::ToolUse,
        Some("stop_sequence") => AnthropicStopReason::StopSequence,
        _ => AnthropicStopReason::Other,
    }
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<AnthropicApiErrorEnvelope>(body).ok()?;
    Some(parsed.error.message)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnthropicApiErrorEnvelope {
    pub error: AnthropicApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnthropicApiError {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnthropicApiRequest {
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<AnthropicApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<AnthropicApiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnthropicApiMessage {
    pub role: &'static str,
    pub content: Vec<AnthropicApiBlock>,
}

impl TryFrom<AnthropicMessage> for AnthropicApiMessage {
    type Error = ProviderError;

    fn try_from(value: AnthropicMessage) -> Result<Self, Self::Error> {
        let content = value
            .content
            .into_iter()
            .filter(|block| !matches!(block, AnthropicContent::Text(text) if text.trim().is_empty()))
            .map(AnthropicApiBlock::from)
            .collect::<Vec<_>>();

        if content.is_empty() {
            return Err(ProviderError::invalid_request(
                "Anthropic message content must not be empty",
            ));
        }

        Ok(Self {
            role: value.role.as_str(),
            content,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum AnthropicApiBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
    #[serde(other)]
    Unknown,
}

impl From<AnthropicContent> for AnthropicApiBlock {
    fn from(value: AnthropicContent) -> Self {
        match value {
            AnthropicContent::Text(text) => Self::Text { text },
            AnthropicContent::ToolUse { id, name, input } => Self::ToolUse { id, name, input },
            AnthropicContent::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => Self::ToolResult {
                tool_use_id,
                content,
                is_error,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AnthropicApiTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl From<AnthropicTool> for AnthropicApiTool {
    fn from(value: AnthropicTool) -> Self {
        Self {
            name: value.name,
            description: value.description,
            input_schema: value.input_schema,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnthropicApiResponse {
    pub model: String,
    #[serde(default)]
    pub content: Vec<AnthropicApiBlock>,
    pub stop_reason: Option<String>,
}

impl From<AnthropicApiResponse> for AnthropicResponse {
    fn from(value: AnthropicApiResponse) -> Self {
        let content = value
            .content
            .into_iter()
            .filter_map(|block| match block {
                AnthropicApiBlock::Text { text } => Some(AnthropicContent::Text(text)),
                AnthropicApiBlock::ToolUse { id, name, input } => {
                    Some(AnthropicContent::ToolUse { id, name, input })
                }
                AnthropicApiBlock::ToolResult { .. } | AnthropicApiBlock::Unknown => None,
            })
            .collect();

        Self {
            model: value.model,
            content,
            stop_reason: parse_stop_reason(value.stop_reason.as_deref()),
        }
    }
}

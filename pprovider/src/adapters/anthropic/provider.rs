//! Anthropic provider implementation over transport and shared models.

use std::sync::Arc;

use crate::{
    CompletionProvider, Decision, ProviderError, ProviderFuture, ProviderId,
    SecureCredentialManager, ToolSchema, Transcript, Turn,
};

use super::auth::resolve_anthropic_api_key;
use super::transport::AnthropicTransport;
use super::types::{
    AnthropicConfig, AnthropicContent, AnthropicMessage, AnthropicRequest, AnthropicRole,
    AnthropicTool,
};

#[derive(Clone)]
pub struct AnthropicProvider {
    credentials: Arc<SecureCredentialManager>,
    transport: Arc<dyn AnthropicTransport>,
    config: AnthropicConfig,
}

impl AnthropicProvider {
    pub fn new(
        credentials: Arc<SecureCredentialManager>,
        transport: Arc<dyn AnthropicTransport>,
    ) -> Self {
        Self {
            credentials,
            transport,
            config: AnthropicConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AnthropicConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    pub(crate) fn build_request(
        &self,
        transcript: &Transcript,
        schemas: &[ToolSchema],
    ) -> AnthropicRequest {
        let mut messages: Vec<AnthropicMessage> = Vec::new();

        for turn in transcript.turns() {
            let (role, blocks) = match turn {
                Turn::System(_) => continue,
                Turn::User(text) => (AnthropicRole::User, vec![AnthropicContent::Text(text.clone())]),
                Turn::Assistant(text) => (
                    AnthropicRole::Assistant,
                    vec![AnthropicContent::Text(text.clone())],
                ),
                Turn::ToolUse { commentary, calls } => {
                    let mut blocks = commentary
                        .iter()
                        .cloned()
                        .map(AnthropicContent::Text)
                        .collect::<Vec<_>>();
                    blocks.extend(calls.iter().map(|call| AnthropicContent::ToolUse {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        input: serde_json::Value::Object(call.arguments.clone()),
                    }));
                    (AnthropicRole::Assistant, blocks)
                }
                Turn::ToolResults(results) => (
                    AnthropicRole::User,
                    results
                        .iter()
                        .map(|result| AnthropicContent::ToolResult {
                            tool_use_id: result.call_id.clone(),
                            content: result.content_text(),
                            is_error: !result.is_success(),
                        })
                        .collect(),
                ),
            };

            // The Messages API requires alternating roles.
            match messages.last_mut() {
                Some(last) if last.role == role => last.content.extend(blocks),
                _ => messages.push(AnthropicMessage {
                    role,
                    content: blocks,
                }),
            }
        }

        AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: transcript.system_prompt(),
            messages,
            tools: schemas.iter().map(AnthropicTool::from).collect(),
        }
    }

    async fn send(
        &self,
        transcript: &Transcript,
        schemas: &[ToolSchema],
    ) -> Result<super::types::AnthropicResponse, ProviderError> {
        self.config.validate()?;
        let api_key = resolve_anthropic_api_key(&self.credentials)?;
        let request = self.build_request(transcript, schemas);
        self.transport.complete(request, api_key).await
    }
}

impl CompletionProvider for AnthropicProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    fn decide<'a>(
        &'a self,
        transcript: &'a Transcript,
        schemas: &'a [ToolSchema],
    ) -> ProviderFuture<'a, Result<Decision, ProviderError>> {
        Box::pin(async move {
            let response = self.send(transcript, schemas).await?;
            Ok(response.into_decision())
        })
    }

    fn finalize<'a>(
        &'a self,
        transcript: &'a Transcript,
        schemas: &'a [ToolSchema],
    ) -> ProviderFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            let response = self.send(transcript, schemas).await?;
            let text = response.text();
            if text.trim().is_empty() {
                return Err(ProviderError::invalid_response(
                    "Anthropic final response contained no text",
                ));
            }

            Ok(text)
        })
    }
}

mod auth;
mod provider;
mod serde_api;
mod transport;
mod types;

pub use provider::AnthropicProvider;
pub use transport::{ANTHROPIC_API_VERSION, AnthropicHttpTransport, AnthropicTransport};
pub use types::{
    AnthropicConfig, AnthropicContent, AnthropicMessage, AnthropicRequest, AnthropicResponse,
    AnthropicRole, AnthropicStopReason, AnthropicTool, DEFAULT_ANTHROPIC_MODEL,
    DEFAULT_MAX_TOKENS,
};

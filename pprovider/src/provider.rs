use std::fmt::{Display, Formatter};

use pcommon::BoxFuture;

use crate::{Decision, ProviderError, ToolSchema, Transcript};

pub type ProviderFuture<'a, T> = BoxFuture<'a, T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Anthropic,
    Custom(&'static str),
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anthropic => f.write_str("anthropic"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// Model-backed decision capability. Implementations must not rely on call affinity.
pub trait CompletionProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    fn decide<'a>(
        &'a self,
        transcript: &'a Transcript,
        schemas: &'a [ToolSchema],
    ) -> ProviderFuture<'a, Result<Decision, ProviderError>>;

    fn finalize<'a>(
        &'a self,
        transcript: &'a Transcript,
        schemas: &'a [ToolSchema],
    ) -> ProviderFuture<'a, Result<String, ProviderError>>;
}

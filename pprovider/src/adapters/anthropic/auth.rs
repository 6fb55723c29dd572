//! Anthropic-specific credential helpers.

use crate::{ProviderError, ProviderId, SecureCredentialManager};

impl SecureCredentialManager {
    /// Stores an Anthropic API key. Keys are expected to start with `sk-ant-`.
    pub fn set_anthropic_api_key(&self, api_key: impl Into<String>) -> Result<(), ProviderError> {
        let api_key = api_key.into();
        if !api_key.starts_with("sk-ant-") {
            return Err(ProviderError::authentication(
                "Anthropic API key must start with 'sk-ant-'",
            ));
        }

        self.set_api_key(ProviderId::Anthropic, api_key)
    }
}

pub(crate) fn resolve_anthropic_api_key(
    credentials: &SecureCredentialManager,
) -> Result<String, ProviderError> {
    credentials
        .api_key(ProviderId::Anthropic)?
        .ok_or_else(|| ProviderError::authentication("no Anthropic API key configured"))
}

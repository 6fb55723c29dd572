//! Environment-driven gateway configuration.
//!
//! Settings are read through the `config` crate from `PARLEY_*` variables plus
//! `ANTHROPIC_API_KEY`. The binary loads a `.env` file first with `dotenvy`.
//!
//! ```rust
//! use parley::GatewayConfig;
//!
//! let config = GatewayConfig::from_vars([
//!     ("ANTHROPIC_API_KEY", "sk-ant-demo"),
//!     ("PARLEY_MAX_TOOL_ROUNDS", "3"),
//! ])
//! .expect("config should parse");
//!
//! assert_eq!(config.bind.to_string(), "127.0.0.1:8080");
//! assert_eq!(config.policy().max_tool_rounds, 3);
//! ```

use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use pagent::OrchestratorPolicy;
use pprovider::{RetryPolicy, SecretString};
use serde::Deserialize;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

pub const ENV_PREFIX: &str = "PARLEY";
pub const ENV_BIND: &str = "PARLEY_BIND";
pub const ENV_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_BASE_URL: &str = "PARLEY_ANTHROPIC_BASE_URL";
pub const ENV_MODEL: &str = "PARLEY_MODEL";
pub const ENV_MAX_TOKENS: &str = "PARLEY_MAX_TOKENS";
pub const ENV_MAX_TOOL_ROUNDS: &str = "PARLEY_MAX_TOOL_ROUNDS";
pub const ENV_TOOL_TIMEOUT_MS: &str = "PARLEY_TOOL_TIMEOUT_MS";
pub const ENV_PROVIDER_MAX_ATTEMPTS: &str = "PARLEY_PROVIDER_MAX_ATTEMPTS";

const ANTHROPIC_PREFIX: &str = "ANTHROPIC";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigErrorKind {
    Load,
    Missing,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub key: &'static str,
    pub message: String,
}

impl ConfigError {
    pub fn load(message: impl Into<String>) -> Self {
        Self {
            kind: ConfigErrorKind::Load,
            key: ENV_PREFIX,
            message: message.into(),
        }
    }

    pub fn missing(key: &'static str) -> Self {
        Self {
            kind: ConfigErrorKind::Missing,
            key,
            message: format!("{key} must be set"),
        }
    }

    pub fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: ConfigErrorKind::Invalid,
            key,
            message: message.into(),
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(error: config::ConfigError) -> Self {
        Self::load(error.to_string())
    }
}

/// Raw settings as the environment provides them. Keys keep their prefix so
/// `PARLEY_ANTHROPIC_BASE_URL` and `ANTHROPIC_*` never collide.
#[derive(Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    parley_bind: Option<String>,
    anthropic_api_key: Option<String>,
    parley_anthropic_base_url: Option<String>,
    parley_model: Option<String>,
    parley_max_tokens: Option<String>,
    parley_max_tool_rounds: Option<String>,
    parley_tool_timeout_ms: Option<String>,
    parley_provider_max_attempts: Option<String>,
}

impl RawSettings {
    fn load(source: Option<config::Map<String, String>>) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .keep_prefix(true)
                    .source(source.clone()),
            )
            .add_source(
                config::Environment::with_prefix(ANTHROPIC_PREFIX)
                    .keep_prefix(true)
                    .source(source),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

#[derive(Debug)]
pub struct GatewayConfig {
    pub bind: SocketAddr,
    pub api_key: SecretString,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub max_tool_rounds: usize,
    pub tool_timeout: Option<Duration>,
    pub provider_max_attempts: u32,
}

impl GatewayConfig {
    /// Loads from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_settings(RawSettings::load(None)?)
    }

    /// Loads from an explicit variable set instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect::<config::Map<String, String>>();
        Self::from_settings(RawSettings::load(Some(source))?)
    }

    fn from_settings(raw: RawSettings) -> Result<Self, ConfigError> {
        let bind = parse_or(ENV_BIND, present(raw.parley_bind), DEFAULT_BIND.parse::<SocketAddr>())?;
        let api_key = present(raw.anthropic_api_key)
            .map(SecretString::new)
            .ok_or_else(|| ConfigError::missing(ENV_API_KEY))?;

        let max_tokens = parse_optional::<u32>(ENV_MAX_TOKENS, present(raw.parley_max_tokens))?;
        if max_tokens == Some(0) {
            return Err(ConfigError::invalid(
                ENV_MAX_TOKENS,
                format!("{ENV_MAX_TOKENS} must be greater than zero"),
            ));
        }

        let max_tool_rounds =
            parse_optional::<usize>(ENV_MAX_TOOL_ROUNDS, present(raw.parley_max_tool_rounds))?
                .unwrap_or(OrchestratorPolicy::default().max_tool_rounds);
        if max_tool_rounds == 0 {
            return Err(ConfigError::invalid(
                ENV_MAX_TOOL_ROUNDS,
                format!("{ENV_MAX_TOOL_ROUNDS} must be at least 1"),
            ));
        }

        let tool_timeout =
            parse_optional::<u64>(ENV_TOOL_TIMEOUT_MS, present(raw.parley_tool_timeout_ms))?
                .filter(|millis| *millis > 0)
                .map(Duration::from_millis);

        let provider_max_attempts = parse_optional::<u32>(
            ENV_PROVIDER_MAX_ATTEMPTS,
            present(raw.parley_provider_max_attempts),
        )?
        .unwrap_or(RetryPolicy::default().max_attempts)
        .max(1);

        Ok(Self {
            bind,
            api_key,
            base_url: present(raw.parley_anthropic_base_url),
            model: present(raw.parley_model),
            max_tokens,
            max_tool_rounds,
            tool_timeout,
            provider_max_attempts,
        })
    }

    pub fn policy(&self) -> OrchestratorPolicy {
        OrchestratorPolicy::default()
            .with_max_tool_rounds(self.max_tool_rounds)
            .with_tool_timeout(self.tool_timeout)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.provider_max_attempts)
    }

    #[cfg(feature = "provider-anthropic")]
    pub fn anthropic_config(&self) -> pprovider::adapters::anthropic::AnthropicConfig {
        let mut config = pprovider::adapters::anthropic::AnthropicConfig::default();
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        if let Some(max_tokens) = self.max_tokens {
            config = config.with_max_tokens(max_tokens);
        }
        config
    }
}

/// Blank values count as unset.
fn present(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_optional<T>(key: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.map(|value| {
        value
            .parse::<T>()
            .map_err(|err| ConfigError::invalid(key, format!("{key}={value:?}: {err}")))
    })
    .transpose()
}

fn parse_or<T, E>(
    key: &'static str,
    raw: Option<String>,
    default: Result<T, E>,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    E: Display,
{
    match parse_optional(key, raw)? {
        Some(value) => Ok(value),
        None => default.map_err(|err| ConfigError::invalid(key, err.to_string())),
    }
}

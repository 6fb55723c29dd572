//! Orchestration and persistence errors.
//!
//! ```rust
//! use pagent::{OrchestratorError, OrchestratorErrorKind};
//! use pprovider::ProviderError;
//!
//! let err = OrchestratorError::from(ProviderError::rate_limited("slow down"));
//! assert_eq!(err.kind, OrchestratorErrorKind::Provider);
//! assert!(err.to_string().contains("slow down"));
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use pprovider::{ProviderError, ProviderErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrchestratorErrorKind {
    InvalidRequest,
    Provider,
    MalformedDecision,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorError {
    pub kind: OrchestratorErrorKind,
    pub message: String,
    pub provider_kind: Option<ProviderErrorKind>,
}

impl OrchestratorError {
    pub fn new(kind: OrchestratorErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            provider_kind: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(OrchestratorErrorKind::InvalidRequest, message)
    }

    pub fn malformed_decision(message: impl Into<String>) -> Self {
        Self::new(OrchestratorErrorKind::MalformedDecision, message)
    }
}

impl Display for OrchestratorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for OrchestratorError {}

impl From<ProviderError> for OrchestratorError {
    fn from(value: ProviderError) -> Self {
        Self {
            kind: OrchestratorErrorKind::Provider,
            message: value.message,
            provider_kind: Some(value.kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    NotFound,
    InvalidFeedback,
    Conflict,
    Backend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::NotFound, message)
    }

    pub fn invalid_feedback(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::InvalidFeedback, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Conflict, message)
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Backend, message)
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for StoreError {}

//! Stable label values for error taxonomies.
//!
//! ```rust
//! use pobserve::ToolFailureClass;
//! use ptooling::ToolErrorKind;
//!
//! assert_eq!(ToolFailureClass::of(ToolErrorKind::InvalidArguments), ToolFailureClass::Rejected);
//! assert_eq!(ToolFailureClass::of(ToolErrorKind::Timeout).as_str(), "timed_out");
//! ```

use pagent::OrchestratorErrorKind;
use pprovider::ProviderErrorKind;
use ptooling::ToolErrorKind;

/// How a failed tool call ended, independent of which tool it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolFailureClass {
    /// The call never reached an executor: unknown name, bad arguments, or a registry clash.
    Rejected,
    TimedOut,
    /// A backing data source was down; retrying later may succeed.
    Unavailable,
    /// The executor ran and failed, panics included.
    Failed,
}

impl ToolFailureClass {
    pub fn of(kind: ToolErrorKind) -> Self {
        match kind {
            ToolErrorKind::NotFound | ToolErrorKind::InvalidArguments | ToolErrorKind::Duplicate => {
                Self::Rejected
            }
            ToolErrorKind::Timeout => Self::TimedOut,
            ToolErrorKind::Unavailable => Self::Unavailable,
            ToolErrorKind::Execution => Self::Failed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rejected => "rejected",
            Self::TimedOut => "timed_out",
            Self::Unavailable => "unavailable",
            Self::Failed => "failed",
        }
    }
}

pub fn tool_error_label(kind: ToolErrorKind) -> &'static str {
    match kind {
        ToolErrorKind::NotFound => "not_found",
        ToolErrorKind::InvalidArguments => "invalid_arguments",
        ToolErrorKind::Execution => "execution",
        ToolErrorKind::Timeout => "timeout",
        ToolErrorKind::Duplicate => "duplicate",
        ToolErrorKind::Unavailable => "unavailable",
    }
}

pub fn provider_error_label(kind: ProviderErrorKind) -> &'static str {
    match kind {
        ProviderErrorKind::Authentication => "authentication",
        ProviderErrorKind::RateLimited => "rate_limited",
        ProviderErrorKind::InvalidRequest => "invalid_request",
        ProviderErrorKind::InvalidResponse => "invalid_response",
        ProviderErrorKind::Timeout => "timeout",
        ProviderErrorKind::Transport => "transport",
        ProviderErrorKind::Unavailable => "unavailable",
        ProviderErrorKind::Other => "other",
    }
}

pub fn round_error_label(kind: OrchestratorErrorKind) -> &'static str {
    match kind {
        OrchestratorErrorKind::InvalidRequest => "invalid_request",
        OrchestratorErrorKind::Provider => "provider",
        OrchestratorErrorKind::MalformedDecision => "malformed_decision",
    }
}

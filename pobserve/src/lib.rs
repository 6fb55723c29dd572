//! Observability hooks for provider calls, tool executions, and orchestration rounds.
//!
//! ```rust
//! use pobserve::{LayeredHooks, MetricsObservabilityHooks, SafeHooks, TracingObservabilityHooks};
//!
//! let _observed = LayeredHooks::new(
//!     SafeHooks::new(TracingObservabilityHooks),
//!     SafeHooks::new(MetricsObservabilityHooks),
//! );
//! ```

mod labels;
mod layered;
mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use labels::{ToolFailureClass, provider_error_label, round_error_label, tool_error_label};
pub use layered::LayeredHooks;
pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::SafeHooks;
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        LayeredHooks, MetricsObservabilityHooks, SafeHooks, ToolFailureClass,
        TracingObservabilityHooks,
    };
}

#[cfg(test)]
mod tests;

//! Deterministic confidence scoring over typed tool outcomes.
//!
//! ```rust
//! use pagent::{NO_TOOL_CONFIDENCE, confidence};
//!
//! assert_eq!(confidence(&[]), NO_TOOL_CONFIDENCE);
//! ```

use pprovider::ToolResult;

/// Confidence reported when a round used no tools.
pub const NO_TOOL_CONFIDENCE: f64 = 0.8;

pub fn confidence(results: &[ToolResult]) -> f64 {
    if results.is_empty() {
        return NO_TOOL_CONFIDENCE;
    }

    let successes = results.iter().filter(|result| result.is_success()).count();
    successes as f64 / results.len() as f64
}

//! Per-call deadline policy for tool futures.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use ptooling::{ToolErrorKind, with_deadline};
//!
//! let runtime = tokio::runtime::Runtime::new().expect("runtime");
//! let outcome = runtime.block_on(with_deadline(
//!     async {
//!         futures_timer::Delay::new(Duration::from_secs(5)).await;
//!         Ok::<_, ptooling::ToolError>(1)
//!     },
//!     Duration::from_millis(5),
//! ));
//! assert_eq!(outcome.expect_err("deadline should expire").kind, ToolErrorKind::Timeout);
//! ```

use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use futures_timer::Delay;
use futures_util::future::{Either, select};

use crate::ToolError;

/// Races `future` against `deadline`; expiry drops the future and yields a timeout error.
pub async fn with_deadline<F, T>(future: F, deadline: Duration) -> Result<T, ToolError>
where
    F: Future<Output = Result<T, ToolError>>,
{
    let future = pin!(future);
    let timer = Delay::new(deadline);

    match select(future, timer).await {
        Either::Left((outcome, _)) => outcome,
        Either::Right(((), _)) => Err(ToolError::timeout(format!(
            "tool call exceeded deadline of {}ms",
            deadline.as_millis()
        ))),
    }
}

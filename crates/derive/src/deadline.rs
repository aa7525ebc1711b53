//! Bounded calls into external collaborators.
//!
//! Every suspension point of the derivation core races its future against a per-call timeout
//! and the caller's [CancellationToken], so a stalled engine or provider never blocks the event
//! loop indefinitely.
//!
//! Racing needs the tokio timer, so it is only available with the `std` feature. Without it,
//! bounded calls run to completion and [CancellationToken] never fires.

use core::{future::Future, time::Duration};

#[cfg(feature = "std")]
pub use tokio_util::sync::CancellationToken;

/// A cancellation handle for targets without an async runtime. It is never cancelled.
#[cfg(not(feature = "std"))]
#[derive(Debug, Clone, Default)]
pub struct CancellationToken;

#[cfg(not(feature = "std"))]
impl CancellationToken {
    /// Creates a new token.
    pub const fn new() -> Self {
        Self
    }

    /// Always false: nothing can cancel a call without a runtime.
    pub const fn is_cancelled(&self) -> bool {
        false
    }
}

/// A bounded call that did not produce a value.
#[derive(derive_more::Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineError {
    /// The per-call timeout elapsed.
    #[display("deadline of {_0:?} elapsed")]
    Elapsed(Duration),
    /// The caller cancelled the call.
    #[display("cancelled")]
    Cancelled,
}

impl core::error::Error for DeadlineError {}

/// Runs `fut` to completion unless `timeout` elapses or `cancel` fires first.
#[cfg(feature = "std")]
pub async fn with_deadline<F>(
    cancel: &CancellationToken,
    timeout: Duration,
    fut: F,
) -> Result<F::Output, DeadlineError>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DeadlineError::Cancelled),
        res = tokio::time::timeout(timeout, fut) => {
            res.map_err(|_| DeadlineError::Elapsed(timeout))
        }
    }
}

/// Runs `fut` to completion. There is no timer to race it against without `std`.
#[cfg(not(feature = "std"))]
pub async fn with_deadline<F>(
    _cancel: &CancellationToken,
    _timeout: Duration,
    fut: F,
) -> Result<F::Output, DeadlineError>
where
    F: Future,
{
    Ok(fut.await)
}

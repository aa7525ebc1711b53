//! Contains driver-related error types.

use crate::EngineClientError;
use rollup_derive::deadline::DeadlineError;
use thiserror::Error;

/// A [Result] type for the [DriverError].
pub type DriverResult<T> = Result<T, DriverError>;

/// Driver error. Every variant stops the driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// The event queue overflowed.
    #[error("Too many events queued, the limit of {0} was exceeded")]
    TooManyEvents(usize),
    /// A deriver reported a critical error.
    #[error("Critical error: {0}")]
    Critical(String),
    /// The driver was closed.
    #[error("Driver closed")]
    Closed,
}

/// A temporary error of the engine. The failed operation is retried on a later step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An engine call did not complete in time.
    #[error("Engine call did not complete: {0}")]
    Deadline(#[from] DeadlineError),
    /// The engine client failed.
    #[error("Engine client error: {0}")]
    Client(#[from] EngineClientError),
    /// The engine answered with a status that cannot be acted upon yet.
    #[error("Unexpected payload status: {0}")]
    UnexpectedStatus(String),
}

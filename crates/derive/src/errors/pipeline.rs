//! This module contains derivation errors thrown within the pipeline.

use crate::{deadline::DeadlineError, errors::BuilderError};
use alloc::string::String;
use alloy_eips::BlockNumHash;
use alloy_primitives::B256;
use core::time::Duration;

/// A result type for the derivation pipeline stages.
pub type PipelineResult<T> = Result<T, PipelineErrorKind>;

/// A top level filter for [PipelineError] that sorts by severity.
#[derive(derive_more::Display, Clone, Debug, PartialEq, Eq)]
pub enum PipelineErrorKind {
    /// A temporary error. The operation can be retried on the next step.
    #[display("Temporary error: {_0}")]
    Temporary(PipelineError),
    /// A critical error. Derivation cannot continue.
    #[display("Critical error: {_0}")]
    Critical(PipelineError),
    /// A reset error. The engine and the pipeline must be reset before deriving further.
    #[display("Pipeline reset: {_0}")]
    Reset(ResetError),
}

impl PipelineErrorKind {
    /// Returns true if the error signals that no more data is available right now.
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Temporary(PipelineError::Eof))
    }
}

impl From<ResetError> for PipelineErrorKind {
    fn from(err: ResetError) -> Self {
        Self::Reset(err)
    }
}

impl core::error::Error for PipelineErrorKind {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Temporary(err) => Some(err),
            Self::Critical(err) => Some(err),
            Self::Reset(err) => Some(err),
        }
    }
}

/// An error encountered during the processing.
#[derive(derive_more::Display, Clone, Debug, PartialEq, Eq)]
pub enum PipelineError {
    /// There is no data to read from the previous stage.
    #[display("EOF")]
    Eof,
    /// Missing L1 origin.
    #[display("Missing L1 origin from previous stage")]
    MissingOrigin,
    /// A bounded call did not complete within its deadline.
    #[display("Deadline of {_0:?} elapsed")]
    Timeout(Duration),
    /// The pipeline was cancelled by its caller.
    #[display("Derivation cancelled")]
    Cancelled,
    /// Attributes builder error variant, with [BuilderError].
    #[display("Attributes builder error: {_0}")]
    AttributesBuilder(BuilderError),
    /// Deposits-only attributes were requested before any attributes were produced.
    #[display("No attributes generated yet")]
    NoAttributesGenerated,
    /// Deposits-only attributes were requested while a batch is still buffered.
    #[display("Unexpected buffered batch, parent hash: {_0}, epoch: {_1:?}")]
    UnexpectedBufferedBatch(B256, BlockNumHash),
    /// Deposits-only attributes were requested for a different parent than the last attributes.
    #[display("Unexpected parent: last parent: {_0:?}, invalid parent: {_1:?}")]
    UnexpectedParent(BlockNumHash, BlockNumHash),
    /// Deposits-only attributes were requested for a different L1 origin than the last
    /// attributes.
    #[display("Unexpected derivation origin: last origin: {_0:?}, invalid origin: {_1:?}")]
    UnexpectedOrigin(Option<BlockNumHash>, BlockNumHash),
    /// Provider error variant.
    #[display("Provider error: {_0}")]
    Provider(String),
}

impl From<BuilderError> for PipelineError {
    fn from(err: BuilderError) -> Self {
        Self::AttributesBuilder(err)
    }
}

impl From<DeadlineError> for PipelineError {
    fn from(err: DeadlineError) -> Self {
        match err {
            DeadlineError::Elapsed(timeout) => Self::Timeout(timeout),
            DeadlineError::Cancelled => Self::Cancelled,
        }
    }
}

impl core::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::AttributesBuilder(err) => Some(err),
            _ => None,
        }
    }
}

impl PipelineError {
    /// Wrap [PipelineError] as a [PipelineErrorKind::Critical].
    pub const fn crit(self) -> PipelineErrorKind {
        PipelineErrorKind::Critical(self)
    }

    /// Wrap [PipelineError] as a [PipelineErrorKind::Temporary].
    pub const fn temp(self) -> PipelineErrorKind {
        PipelineErrorKind::Temporary(self)
    }
}

/// A reset error
#[derive(derive_more::Display, Clone, Debug, Eq, PartialEq)]
pub enum ResetError {
    /// The batch has a bad parent hash.
    /// The first argument is the expected parent hash, and the second argument is the actual
    /// parent hash.
    #[display("Bad parent hash: expected {_0}, got {_1}")]
    BadParentHash(B256, B256),
    /// The batch has a bad timestamp.
    /// The first argument is the expected timestamp, and the second argument is the actual
    /// timestamp.
    #[display("Bad timestamp: expected {_0}, got {_1}")]
    BadTimestamp(u64, u64),
    /// The engine has not confirmed its reset yet.
    #[display("Cannot continue derivation until the engine has been reset")]
    EngineNotReset,
    /// The new L1 origin does not extend the previous one.
    /// The first argument is the expected hash, and the second argument is the actual hash.
    #[display("L1 reorg detected: expected {_0}, got {_1}")]
    ReorgDetected(B256, B256),
    /// The parent of the L2 block the pipeline rewinds from could not be fetched.
    #[display("Failed to fetch L2 parent block {_0}: {_1}")]
    MissingL2Parent(B256, String),
    /// Attributes builder error variant, with [BuilderError].
    #[display("Attributes builder error: {_0}")]
    AttributesBuilder(BuilderError),
}

impl From<BuilderError> for ResetError {
    fn from(err: BuilderError) -> Self {
        Self::AttributesBuilder(err)
    }
}

impl core::error::Error for ResetError {}

impl ResetError {
    /// Wrap [ResetError] as a [PipelineErrorKind::Reset].
    pub const fn reset(self) -> PipelineErrorKind {
        PipelineErrorKind::Reset(self)
    }
}

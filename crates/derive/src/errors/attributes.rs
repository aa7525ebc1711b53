//! Error types for the attributes builder.

use alloc::string::String;
use alloy_eips::BlockNumHash;

/// An [AttributesBuilder] Error.
///
/// [AttributesBuilder]: crate::traits::AttributesBuilder
#[derive(derive_more::Display, Clone, Debug, PartialEq, Eq)]
pub enum BuilderError {
    /// Mismatched blocks.
    #[display("Block mismatch. Expected {_0:?}, got {_1:?}")]
    BlockMismatch(BlockNumHash, BlockNumHash),
    /// The L1 origin of the epoch could not be fetched.
    #[display("Epoch origin unavailable: {_0:?}")]
    EpochUnavailable(BlockNumHash),
    /// Attributes unavailable.
    #[display("Attributes unavailable")]
    AttributesUnavailable,
    /// A custom error.
    #[display("Error in attributes builder: {_0}")]
    Custom(String),
}

impl core::error::Error for BuilderError {}

//! The [EngineClient] trait.

use alloy_rpc_types_engine::{ForkchoiceState, PayloadStatus};
use async_trait::async_trait;
use rollup_protocol::ExecutionPayloadEnvelope;
use thiserror::Error;

/// The [EngineClient] trait defines a minimal asynchronous interface for interacting with the
/// Engine API on behalf of a rollup node.
///
/// Implementations of this trait are consumed by the [EngDeriver] to insert payloads and update
/// the forkchoice of the execution layer. Block building happens outside of the derivation core.
///
/// [EngDeriver]: crate::EngDeriver
#[async_trait]
pub trait EngineClient: Send {
    /// Inserts a payload into the execution layer.
    async fn new_payload(
        &mut self,
        envelope: &ExecutionPayloadEnvelope,
    ) -> Result<PayloadStatus, EngineClientError>;

    /// Sends a forkchoice update to the execution layer, without building a block.
    async fn forkchoice_updated(
        &mut self,
        state: ForkchoiceState,
    ) -> Result<PayloadStatus, EngineClientError>;
}

/// An error returned by an [EngineClient].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineClientError {
    /// The transport or the engine failed.
    #[error("RPC error: {0}")]
    Rpc(String),
    /// The engine refused the forkchoice state as inconsistent.
    #[error("Invalid forkchoice state: {0}")]
    InvalidForkchoiceState(String),
}

//! Testing utilities for the attributes queue stage.

use crate::{
    batch::SingleBatch,
    errors::{BuilderError, PipelineError, PipelineErrorKind, PipelineResult},
    traits::{
        AttributesBuilder, AttributesProvider, DerivationStage, OriginProvider, ResettableStage,
        StageReset,
    },
};
use alloy_eips::BlockNumHash;
use async_trait::async_trait;
use core::time::Duration;
use rollup_protocol::{BlockInfo, L2BlockInfo, PayloadAttributes, SystemConfig};

/// A mock implementation of the [AttributesBuilder] for testing.
#[derive(Debug, Default)]
pub struct TestAttributesBuilder {
    /// The attributes to return, popped from the back.
    pub attributes: Vec<anyhow::Result<PayloadAttributes>>,
    /// Delay applied before every call returns.
    pub delay: Option<Duration>,
}

#[async_trait]
impl AttributesBuilder for TestAttributesBuilder {
    async fn prepare_payload_attributes(
        &mut self,
        _l2_parent: L2BlockInfo,
        _epoch: BlockNumHash,
    ) -> PipelineResult<PayloadAttributes> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.attributes.pop() {
            Some(Ok(attrs)) => Ok(attrs),
            Some(Err(err)) => {
                Err(PipelineErrorKind::Temporary(BuilderError::Custom(err.to_string()).into()))
            }
            None => Err(PipelineErrorKind::Critical(BuilderError::AttributesUnavailable.into())),
        }
    }
}

/// A mock implementation of the batch provider feeding the attributes queue.
#[derive(Debug, Default)]
pub struct TestAttributesProvider {
    /// The origin of the L1 block.
    origin: Option<BlockInfo>,
    /// A list of batches to return, popped from the back.
    batches: Vec<PipelineResult<SingleBatch>>,
    /// The number of resets received.
    pub resets: usize,
}

impl TestAttributesProvider {
    /// Creates a new provider with the given origin and batches.
    pub const fn new(origin: Option<BlockInfo>, batches: Vec<PipelineResult<SingleBatch>>) -> Self {
        Self { origin, batches, resets: 0 }
    }
}

impl OriginProvider for TestAttributesProvider {
    fn origin(&self) -> Option<BlockInfo> {
        self.origin
    }
}

#[async_trait]
impl ResettableStage for TestAttributesProvider {
    async fn reset(&mut self, _base: BlockInfo, _cfg: &SystemConfig) -> PipelineResult<StageReset> {
        self.resets += 1;
        Ok(StageReset::Done)
    }
}

impl DerivationStage for TestAttributesProvider {}

#[async_trait]
impl AttributesProvider for TestAttributesProvider {
    async fn next_batch(&mut self, _parent: L2BlockInfo) -> PipelineResult<SingleBatch> {
        self.batches.pop().ok_or(PipelineError::Eof.temp())?
    }

    fn is_last_in_span(&self) -> bool {
        self.batches.is_empty()
    }
}

//! Contains traits for working with payload attributes and their providers.

use crate::{
    batch::SingleBatch,
    errors::PipelineResult,
    traits::{DerivationStage, OriginProvider},
};
use alloy_eips::BlockNumHash;
use alloc::boxed::Box;
use async_trait::async_trait;
use rollup_protocol::{AttributesWithParent, BlockInfo, L2BlockInfo, PayloadAttributes};

/// [AttributesBuilder] is responsible for preparing [PayloadAttributes]
/// that can be used to construct an L2 Block containing only deposits.
#[async_trait]
pub trait AttributesBuilder {
    /// Prepares a template [PayloadAttributes] that is ready to be used to build an L2
    /// block. The block will contain deposits only, on top of the given L2 parent, with the L1
    /// origin set to the given epoch.
    /// By default, the [PayloadAttributes] template will have `no_tx_pool` set to true,
    /// and no sequencer transactions: the caller has to modify the template to add transactions.
    /// This can be done by either setting the `no_tx_pool` to false as sequencer, or by appending
    /// batch transactions as verifier.
    async fn prepare_payload_attributes(
        &mut self,
        l2_parent: L2BlockInfo,
        epoch: BlockNumHash,
    ) -> PipelineResult<PayloadAttributes>;
}

/// [AttributesProvider] is a trait abstraction that generalizes the batch-decoding stages that
/// feed the attributes queue.
#[async_trait]
pub trait AttributesProvider: OriginProvider + DerivationStage {
    /// Returns the next valid batch upon the given safe head.
    async fn next_batch(&mut self, parent: L2BlockInfo) -> PipelineResult<SingleBatch>;

    /// Returns whether the current batch is the last in its span.
    fn is_last_in_span(&self) -> bool;
}

/// [NextAttributes] defines the interface for pulling attributes from
/// the top level `AttributesQueue` stage of the pipeline.
#[async_trait]
pub trait NextAttributes {
    /// Returns the next [AttributesWithParent] from the current batch.
    async fn next_attributes(&mut self, parent: L2BlockInfo)
        -> PipelineResult<AttributesWithParent>;

    /// Returns the last produced attributes with every non-deposit transaction stripped.
    ///
    /// Used to retry a block whose full payload was rejected by the engine. `parent` and
    /// `derived_from` must match the last attributes produced.
    fn deposits_only_attributes(
        &mut self,
        parent: BlockNumHash,
        derived_from: BlockInfo,
    ) -> PipelineResult<AttributesWithParent>;
}

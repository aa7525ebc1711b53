//! Defines the interface for the core derivation pipeline.

use crate::{errors::PipelineResult, traits::OriginProvider};
use alloc::boxed::Box;
use alloy_eips::BlockNumHash;
use async_trait::async_trait;
use rollup_protocol::{AttributesWithParent, BlockInfo, L2BlockInfo, RollupConfig};

/// The progress made by a single [Pipeline::step].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Attributes were prepared on top of the pending safe head.
    PreparedAttributes(AttributesWithParent),
    /// A stage reset step was performed. The pipeline should be stepped again.
    ResetProgress,
    /// The pipeline has no more data to derive from right now.
    Eof,
}

/// This trait defines the interface for interacting with the derivation pipeline.
#[async_trait]
pub trait Pipeline: OriginProvider {
    /// Attempts to progress the pipeline on top of the given pending safe head.
    async fn step(&mut self, pending_safe_head: L2BlockInfo) -> PipelineResult<StepOutcome>;

    /// Forgets all reset progress. The pipeline will refuse to derive until the engine reset is
    /// confirmed again.
    fn reset(&mut self);

    /// Marks the engine reset as complete, allowing the stage reset walk to begin.
    fn confirm_engine_reset(&mut self);

    /// Returns the last produced attributes with every non-deposit transaction stripped.
    fn deposits_only_attributes(
        &mut self,
        parent: BlockNumHash,
        derived_from: BlockInfo,
    ) -> PipelineResult<AttributesWithParent>;

    /// Returns the rollup config.
    fn rollup_config(&self) -> &RollupConfig;
}

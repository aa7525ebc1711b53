//! Test Utilities for the [crate::pipeline::DerivationPipeline].

use crate::{
    errors::{PipelineError, PipelineResult},
    pipeline::{DerivationPipeline, PipelineBuilder},
    test_utils::{TestChainProvider, TestL2ChainProvider},
    traits::{
        DerivationStage, ForkTransformer, NextAttributes, OriginProvider, ResettableStage,
        StageReset,
    },
};
use alloy_eips::BlockNumHash;
use async_trait::async_trait;
use rollup_protocol::{
    AttributesWithParent, BlockInfo, Hardfork, L2BlockInfo, RollupConfig, SystemConfig,
};
use std::sync::Arc;

/// A fully custom [NextAttributes].
#[derive(Default, Debug, Clone)]
pub struct TestNextAttributes {
    /// The next [AttributesWithParent] to return. Taken on use.
    pub next_attributes: Option<AttributesWithParent>,
    /// The deposits-only attributes to return.
    pub deposits_only: Option<AttributesWithParent>,
    /// The reported origin.
    pub origin: Option<BlockInfo>,
    /// Every reset received.
    pub resets: Vec<(BlockInfo, SystemConfig)>,
    /// The forks the stage was transformed for.
    pub transforms: Vec<Hardfork>,
}

#[async_trait]
impl ResettableStage for TestNextAttributes {
    async fn reset(&mut self, base: BlockInfo, cfg: &SystemConfig) -> PipelineResult<StageReset> {
        self.resets.push((base, *cfg));
        Ok(StageReset::Done)
    }
}

impl OriginProvider for TestNextAttributes {
    fn origin(&self) -> Option<BlockInfo> {
        self.origin
    }
}

impl ForkTransformer for TestNextAttributes {
    fn transform(&mut self, fork: Hardfork) {
        self.transforms.push(fork);
    }
}

impl DerivationStage for TestNextAttributes {
    fn as_fork_transformer(&mut self) -> Option<&mut dyn ForkTransformer> {
        Some(self)
    }
}

#[async_trait]
impl NextAttributes for TestNextAttributes {
    async fn next_attributes(&mut self, _: L2BlockInfo) -> PipelineResult<AttributesWithParent> {
        self.next_attributes.take().ok_or(PipelineError::Eof.temp())
    }

    fn deposits_only_attributes(
        &mut self,
        _: BlockNumHash,
        _: BlockInfo,
    ) -> PipelineResult<AttributesWithParent> {
        self.deposits_only.clone().ok_or(PipelineError::NoAttributesGenerated.crit())
    }
}

/// A [DerivationPipeline] over test doubles.
pub type TestPipeline =
    DerivationPipeline<TestNextAttributes, TestChainProvider, TestL2ChainProvider>;

/// Creates a new [TestPipeline] with a default rollup config and empty providers.
pub fn new_test_pipeline() -> TestPipeline {
    PipelineBuilder::new(
        Arc::new(RollupConfig::default()),
        TestNextAttributes::default(),
        TestChainProvider::default(),
        TestL2ChainProvider::default(),
    )
    .build()
}

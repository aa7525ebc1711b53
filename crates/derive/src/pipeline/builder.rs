//! Contains the `PipelineBuilder` object that is used to build a `DerivationPipeline`.

use super::{
    ChainProvider, DerivationPipeline, DerivationStage, L2ChainProvider, NextAttributes,
    OriginProvider,
};
use crate::{deadline::CancellationToken, metrics::PipelineMetrics};
use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::{fmt::Debug, time::Duration};
use rollup_protocol::RollupConfig;

/// The default deadline for a single provider lookup made by the pipeline.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// The PipelineBuilder constructs a [DerivationPipeline].
///
/// Stages added with [PipelineBuilder::stage] are reset in insertion order, ahead of the
/// attributes stage.
#[derive(Debug)]
pub struct PipelineBuilder<S, L1, L2>
where
    S: NextAttributes + OriginProvider + DerivationStage,
    L1: ChainProvider + Debug + Send,
    L2: L2ChainProvider + Debug + Send,
{
    rollup_config: Arc<RollupConfig>,
    attributes: S,
    l1_provider: L1,
    l2_provider: L2,
    stages: Vec<Box<dyn DerivationStage>>,
    metrics: Option<PipelineMetrics>,
    fetch_timeout: Duration,
    cancel: Option<CancellationToken>,
}

impl<S, L1, L2> PipelineBuilder<S, L1, L2>
where
    S: NextAttributes + OriginProvider + DerivationStage,
    L1: ChainProvider + Debug + Send,
    L2: L2ChainProvider + Debug + Send,
{
    /// Creates a new pipeline builder.
    pub fn new(
        rollup_config: Arc<RollupConfig>,
        attributes: S,
        l1_provider: L1,
        l2_provider: L2,
    ) -> Self {
        Self {
            rollup_config,
            attributes,
            l1_provider,
            l2_provider,
            stages: Vec::new(),
            metrics: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            cancel: None,
        }
    }

    /// Appends a stage that is reset before the attributes stage.
    pub fn stage(mut self, stage: Box<dyn DerivationStage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Sets the metrics implementation for the pipeline.
    pub fn metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Sets the deadline for provider lookups made during a reset.
    pub const fn fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Sets the cancellation token observed by the pipeline's bounded calls.
    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Builds the pipeline.
    pub fn build(self) -> DerivationPipeline<S, L1, L2> {
        self.into()
    }
}

impl<S, L1, L2> From<PipelineBuilder<S, L1, L2>> for DerivationPipeline<S, L1, L2>
where
    S: NextAttributes + OriginProvider + DerivationStage,
    L1: ChainProvider + Debug + Send,
    L2: L2ChainProvider + Debug + Send,
{
    fn from(builder: PipelineBuilder<S, L1, L2>) -> Self {
        Self {
            attributes: builder.attributes,
            stages: builder.stages,
            resetting: 0,
            engine_is_reset: false,
            origin: None,
            reset_l2_safe: None,
            reset_sys_config: None,
            rollup_config: builder.rollup_config,
            l1_provider: builder.l1_provider,
            l2_provider: builder.l2_provider,
            metrics: builder.metrics.unwrap_or_default(),
            fetch_timeout: builder.fetch_timeout,
            cancel: builder.cancel.unwrap_or_else(CancellationToken::new),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_utils::{TestChainProvider, TestL2ChainProvider, TestNextAttributes, TestStage},
        traits::OriginProvider,
    };

    #[test]
    fn test_builder_defaults() {
        let pipeline = PipelineBuilder::new(
            Arc::new(RollupConfig::default()),
            TestNextAttributes::default(),
            TestChainProvider::default(),
            TestL2ChainProvider::default(),
        )
        .build();
        assert_eq!(pipeline.stage_count(), 1);
        assert!(pipeline.is_resetting());
        assert!(pipeline.origin().is_none());
        assert_eq!(pipeline.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
    }

    #[test]
    fn test_builder_stages_and_timeout() {
        let pipeline = PipelineBuilder::new(
            Arc::new(RollupConfig::default()),
            TestNextAttributes::default(),
            TestChainProvider::default(),
            TestL2ChainProvider::default(),
        )
        .stage(Box::new(TestStage::continuing(0)))
        .stage(Box::new(TestStage::continuing(1)))
        .fetch_timeout(Duration::from_secs(3))
        .build();
        assert_eq!(pipeline.stage_count(), 3);
        assert_eq!(pipeline.fetch_timeout, Duration::from_secs(3));
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_builder_cancellation() {
        let cancel = CancellationToken::new();
        let pipeline = PipelineBuilder::new(
            Arc::new(RollupConfig::default()),
            TestNextAttributes::default(),
            TestChainProvider::default(),
            TestL2ChainProvider::default(),
        )
        .cancellation(cancel.clone())
        .build();
        assert!(!pipeline.cancel.is_cancelled());

        cancel.cancel();
        assert!(pipeline.cancel.is_cancelled());
    }
}

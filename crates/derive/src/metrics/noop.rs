use crate::{
    errors::PipelineResult,
    metrics::PipelineMetrics,
    traits::{DerivationPipelineMetrics, StepOutcome},
};
use alloc::sync::Arc;
use rollup_protocol::BlockInfo;

impl PipelineMetrics {
    /// No-op implementation for `PipelineMetrics`.
    pub fn no_op() -> Self {
        Self { derivation_pipeline_metrics: Arc::new(NoopDerivationPipelineMetrics) }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::no_op()
    }
}

/// No-op implementation of `DerivationPipelineMetrics`.
#[derive(Debug)]
struct NoopDerivationPipelineMetrics;

impl DerivationPipelineMetrics for NoopDerivationPipelineMetrics {
    fn record_step_result(&self, _result: &PipelineResult<StepOutcome>) {
        // No-op
    }

    fn record_reset(&self) {
        // No-op
    }

    fn record_origin(&self, _origin: &BlockInfo) {
        // No-op
    }
}

//! Metrics for the derivation pipeline.

mod noop;

#[cfg(feature = "metrics")]
mod prometheus;
#[cfg(feature = "metrics")]
pub use prometheus::{PrometheusMetrics, ORIGIN_GAUGE, PIPELINE_RESETS, STEP_RESULTS};

use crate::{
    errors::PipelineResult,
    traits::{DerivationPipelineMetrics, StepOutcome},
};
use alloc::sync::Arc;
use core::fmt::Debug;
use rollup_protocol::BlockInfo;

/// Composite metrics handle held by the pipeline.
///
/// Wraps any [DerivationPipelineMetrics] implementation; [PipelineMetrics::no_op] is used when
/// the embedder does not collect metrics.
#[derive(Clone)]
pub struct PipelineMetrics {
    pub(crate) derivation_pipeline_metrics: Arc<dyn DerivationPipelineMetrics + Send + Sync>,
}

impl PipelineMetrics {
    /// Creates a new [PipelineMetrics] around the given implementation.
    pub fn new(metrics: Arc<dyn DerivationPipelineMetrics + Send + Sync>) -> Self {
        Self { derivation_pipeline_metrics: metrics }
    }
}

impl Debug for PipelineMetrics {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PipelineMetrics").finish()
    }
}

impl DerivationPipelineMetrics for PipelineMetrics {
    fn record_step_result(&self, result: &PipelineResult<StepOutcome>) {
        self.derivation_pipeline_metrics.record_step_result(result)
    }

    fn record_reset(&self) {
        self.derivation_pipeline_metrics.record_reset()
    }

    fn record_origin(&self, origin: &BlockInfo) {
        self.derivation_pipeline_metrics.record_origin(origin)
    }
}

//! Telemetry capability injected into the derivation pipeline.

use crate::{errors::PipelineResult, traits::StepOutcome};
use rollup_protocol::BlockInfo;

/// Metrics recorded by the [DerivationPipeline].
///
/// [DerivationPipeline]: crate::pipeline::DerivationPipeline
pub trait DerivationPipelineMetrics {
    /// Records the result of a pipeline step.
    fn record_step_result(&self, result: &PipelineResult<StepOutcome>);

    /// Records that the pipeline rewound its L1 traversal for a reset.
    fn record_reset(&self);

    /// Records the L1 origin the pipeline is deriving from.
    fn record_origin(&self, origin: &BlockInfo);
}

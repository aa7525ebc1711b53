//! Prometheus-backed pipeline metrics.

use crate::{
    errors::{PipelineErrorKind, PipelineResult},
    inc, set,
    traits::{DerivationPipelineMetrics, StepOutcome},
};
use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_int_counter, register_int_gauge};
use prometheus::{CounterVec, IntCounter, IntGauge};
use rollup_protocol::BlockInfo;

lazy_static! {
    /// Tracks the L1 origin of the derivation pipeline.
    pub static ref ORIGIN_GAUGE: IntGauge = register_int_gauge!(
        "rollup_derive_origin_gauge",
        "Tracks the L1 origin of the derivation pipeline"
    ).expect("Origin Gauge failed to register");

    /// Tracks the number of pipeline resets.
    pub static ref PIPELINE_RESETS: IntCounter = register_int_counter!(
        "rollup_derive_pipeline_resets",
        "Number of times the pipeline rewound its L1 traversal"
    ).expect("Pipeline Resets failed to register");

    /// Tracks pipeline step results by outcome.
    pub static ref STEP_RESULTS: CounterVec = register_counter_vec!(
        "rollup_derive_step_results",
        "Number of pipeline steps by outcome",
        &["outcome"]
    ).expect("Step Results failed to register");
}

/// A [DerivationPipelineMetrics] implementation that records into the global prometheus
/// registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusMetrics;

impl DerivationPipelineMetrics for PrometheusMetrics {
    fn record_step_result(&self, result: &PipelineResult<StepOutcome>) {
        let outcome = match result {
            Ok(StepOutcome::PreparedAttributes(_)) => "prepared_attributes",
            Ok(StepOutcome::ResetProgress) => "reset_progress",
            Ok(StepOutcome::Eof) => "eof",
            Err(PipelineErrorKind::Temporary(_)) => "temporary_error",
            Err(PipelineErrorKind::Reset(_)) => "reset_error",
            Err(PipelineErrorKind::Critical(_)) => "critical_error",
        };
        inc!(STEP_RESULTS, &[outcome]);
    }

    fn record_reset(&self) {
        inc!(PIPELINE_RESETS);
    }

    fn record_origin(&self, origin: &BlockInfo) {
        set!(ORIGIN_GAUGE, origin.number as i64);
    }
}

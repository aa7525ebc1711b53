#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(any(test, feature = "test-utils")), warn(unused_crate_dependencies))]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

#[macro_use]
extern crate tracing;

/// Re-export commonly used types and traits.
pub mod prelude {
    pub use crate::{
        batch::SingleBatch,
        deadline::{with_deadline, CancellationToken, DeadlineError},
        errors::{PipelineError, PipelineErrorKind, PipelineResult, ResetError},
        metrics::PipelineMetrics,
        pipeline::{DerivationPipeline, PipelineBuilder},
        stages::AttributesQueue,
        traits::{
            AttributesBuilder, AttributesProvider, ChainProvider, DerivationStage,
            ForkTransformer, L2ChainProvider, NextAttributes, OriginProvider, Pipeline,
            ResettableStage, StageReset, StepOutcome,
        },
    };
}

pub mod batch;
pub mod deadline;
pub mod errors;
pub mod metrics;
pub mod pipeline;
pub mod stages;
pub mod traits;

mod macros;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

//! Module containing the derivation pipeline.

/// Re-export trait arguments.
pub use crate::traits::{
    ChainProvider, DerivationStage, L2ChainProvider, NextAttributes, OriginProvider, Pipeline,
    ResettableStage, StepOutcome,
};

/// Re-export commonly used types.
pub use crate::errors::{PipelineErrorKind, PipelineResult};

mod builder;
pub use builder::{PipelineBuilder, DEFAULT_FETCH_TIMEOUT};

mod core;
pub use core::DerivationPipeline;

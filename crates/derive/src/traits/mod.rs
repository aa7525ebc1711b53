//! This module contains all of the traits describing functionality of portions of the derivation
//! pipeline.

mod pipeline;
pub use pipeline::{Pipeline, StepOutcome};

mod attributes;
pub use attributes::{AttributesBuilder, AttributesProvider, NextAttributes};

mod providers;
pub use providers::{ChainProvider, L2ChainProvider};

mod stages;
pub use stages::{DerivationStage, ForkTransformer, OriginProvider, ResettableStage, StageReset};

mod metrics;
pub use metrics::DerivationPipelineMetrics;

//! This module contains common traits for stages within the derivation pipeline.

use crate::errors::PipelineResult;
use alloc::boxed::Box;
use async_trait::async_trait;
use core::fmt::Debug;
use rollup_protocol::{BlockInfo, Hardfork, SystemConfig};

/// The outcome of a single [ResettableStage::reset] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageReset {
    /// The stage has nothing more to do for this reset; the pipeline moves on to the next stage.
    Done,
    /// The stage made progress but needs to be reset again before it is done.
    Continue,
}

/// Describes the functionality of a resettable stage within the derivation pipeline.
#[async_trait]
pub trait ResettableStage {
    /// Resets the derivation stage against the given L1 `base` and [SystemConfig].
    async fn reset(&mut self, base: BlockInfo, cfg: &SystemConfig) -> PipelineResult<StageReset>;
}

/// A stage that changes behaviour when the L1 origin crosses a hardfork activation.
pub trait ForkTransformer {
    /// Transforms the stage for the newly activated [Hardfork].
    fn transform(&mut self, fork: Hardfork);
}

/// A stage hosted by the [DerivationPipeline].
///
/// [DerivationPipeline]: crate::pipeline::DerivationPipeline
pub trait DerivationStage: ResettableStage + Debug + Send {
    /// Returns the stage as a [ForkTransformer], if it reacts to hardfork activations.
    fn as_fork_transformer(&mut self) -> Option<&mut dyn ForkTransformer> {
        None
    }
}

/// Provides a method for accessing the pipeline's current L1 origin.
pub trait OriginProvider {
    /// Returns the optional L1 [BlockInfo] origin.
    fn origin(&self) -> Option<BlockInfo>;
}

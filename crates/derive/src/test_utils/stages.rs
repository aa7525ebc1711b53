//! A configurable stage for exercising the pipeline's reset walk.

use crate::{
    errors::{PipelineErrorKind, PipelineResult},
    traits::{DerivationStage, ForkTransformer, ResettableStage, StageReset},
};
use async_trait::async_trait;
use rollup_protocol::{BlockInfo, Hardfork, SystemConfig};
use spin::Mutex;
use std::sync::Arc;

/// A stage that records its resets and fork transformations.
#[derive(Debug, Default)]
pub struct TestStage {
    /// The number of resets received.
    pub resets: usize,
    /// How many resets answer [StageReset::Continue] before the stage reports done.
    pub continue_for: usize,
    /// An error returned by every reset, if set.
    pub error: Option<PipelineErrorKind>,
    /// The forks the stage was transformed for, shared so tests can inspect a boxed stage.
    pub transforms: Arc<Mutex<Vec<Hardfork>>>,
}

impl TestStage {
    /// A stage that needs `continue_for` extra resets before it is done.
    pub fn continuing(continue_for: usize) -> Self {
        Self { continue_for, ..Default::default() }
    }

    /// A stage whose reset always fails with `error`.
    pub fn failing(error: PipelineErrorKind) -> Self {
        Self { error: Some(error), ..Default::default() }
    }
}

#[async_trait]
impl ResettableStage for TestStage {
    async fn reset(&mut self, _base: BlockInfo, _cfg: &SystemConfig) -> PipelineResult<StageReset> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        self.resets += 1;
        if self.resets > self.continue_for {
            Ok(StageReset::Done)
        } else {
            Ok(StageReset::Continue)
        }
    }
}

impl ForkTransformer for TestStage {
    fn transform(&mut self, fork: Hardfork) {
        self.transforms.lock().push(fork);
    }
}

impl DerivationStage for TestStage {
    fn as_fork_transformer(&mut self) -> Option<&mut dyn ForkTransformer> {
        Some(self)
    }
}

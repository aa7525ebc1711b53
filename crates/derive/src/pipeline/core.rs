//! Contains the core derivation pipeline.

use crate::{
    deadline::{with_deadline, CancellationToken},
    errors::{PipelineError, PipelineErrorKind, PipelineResult, ResetError},
    metrics::PipelineMetrics,
    traits::{
        ChainProvider, DerivationPipelineMetrics, DerivationStage, L2ChainProvider,
        NextAttributes, OriginProvider, Pipeline, StageReset, StepOutcome,
    },
};
use alloc::{boxed::Box, string::ToString, sync::Arc, vec::Vec};
use alloy_eips::BlockNumHash;
use async_trait::async_trait;
use core::{fmt::Debug, time::Duration};
use rollup_protocol::{AttributesWithParent, BlockInfo, L2BlockInfo, RollupConfig, SystemConfig};

/// The derivation pipeline is responsible for deriving L2 inputs from L1 data.
///
/// The pipeline hosts an ordered list of stages, topped by the attributes stage `S`. After a
/// reset it refuses to derive until [DerivationPipeline::confirm_engine_reset] is called, then
/// rewinds to the parent of the pending safe head and resets every stage, one per step, before
/// handing out attributes again.
#[derive(Debug)]
pub struct DerivationPipeline<S, L1, L2>
where
    S: NextAttributes + OriginProvider + DerivationStage,
    L1: ChainProvider + Debug + Send,
    L2: L2ChainProvider + Debug + Send,
{
    /// A handle to the next attributes.
    pub(crate) attributes: S,
    /// Stages reset ahead of the attributes stage, in order.
    pub(crate) stages: Vec<Box<dyn DerivationStage>>,
    /// Index of the next stage to reset. Equal to the stage count once every stage is reset.
    pub(crate) resetting: usize,
    /// Whether the engine confirmed its reset.
    pub(crate) engine_is_reset: bool,
    /// The L1 origin the pipeline is deriving from.
    pub(crate) origin: Option<BlockInfo>,
    /// The pending safe head the current reset was prepared for.
    pub(crate) reset_l2_safe: Option<L2BlockInfo>,
    /// The system config the stages are reset against.
    pub(crate) reset_sys_config: Option<SystemConfig>,
    /// The rollup config.
    pub(crate) rollup_config: Arc<RollupConfig>,
    /// The L1 chain provider used to look up the reset origin.
    pub(crate) l1_provider: L1,
    /// The L2 chain provider used to walk back the safe chain on reset.
    pub(crate) l2_provider: L2,
    /// Pipeline metrics.
    pub(crate) metrics: PipelineMetrics,
    /// Deadline for a single provider lookup during a reset.
    pub(crate) fetch_timeout: Duration,
    /// Cancellation of the caller driving the pipeline.
    pub(crate) cancel: CancellationToken,
}

impl<S, L1, L2> DerivationPipeline<S, L1, L2>
where
    S: NextAttributes + OriginProvider + DerivationStage,
    L1: ChainProvider + Debug + Send,
    L2: L2ChainProvider + Debug + Send,
{
    /// Returns the number of stages hosted by the pipeline, including the attributes stage.
    pub fn stage_count(&self) -> usize {
        self.stages.len() + 1
    }

    /// Returns true while stages remain to be reset.
    pub fn is_resetting(&self) -> bool {
        self.resetting < self.stage_count()
    }

    /// Returns true once the engine reset was confirmed.
    pub const fn engine_is_reset(&self) -> bool {
        self.engine_is_reset
    }

    /// Returns the pending safe head the current reset was prepared for.
    pub const fn reset_l2_safe(&self) -> Option<L2BlockInfo> {
        self.reset_l2_safe
    }

    /// Returns the [SystemConfig] the stages were last reset against.
    pub const fn reset_system_config(&self) -> Option<&SystemConfig> {
        self.reset_sys_config.as_ref()
    }

    /// Notifies every stage that opts in through [DerivationStage::as_fork_transformer] when the
    /// move from `old_origin` to `new_origin` crosses a hardfork activation.
    pub fn transform_stages(&mut self, old_origin: BlockInfo, new_origin: BlockInfo) {
        let Some(fork) =
            self.rollup_config.is_activation_block(old_origin.timestamp, new_origin.timestamp)
        else {
            return;
        };

        info!(target: "pipeline", %fork, "Transforming stages");
        for stage in self.stages.iter_mut() {
            if let Some(transformer) = stage.as_fork_transformer() {
                transformer.transform(fork);
            }
        }
        if let Some(transformer) = self.attributes.as_fork_transformer() {
            transformer.transform(fork);
        }
    }

    /// Rewinds the pipeline origin so that derivation restarts from the parent of the pending
    /// safe head, and fetches the [SystemConfig] to reset the stages against.
    async fn initial_reset(&mut self, pending_safe_head: L2BlockInfo) -> PipelineResult<()> {
        info!(target: "pipeline", "Rewinding derivation-pipeline L1 traversal to handle reset");
        self.metrics.record_reset();

        let pipeline_l2 = if pending_safe_head.block_info.number >
            self.rollup_config.genesis.l2.number
        {
            let parent_hash = pending_safe_head.block_info.parent_hash;
            with_deadline(
                &self.cancel,
                self.fetch_timeout,
                self.l2_provider.l2_block_info_by_hash(parent_hash),
            )
            .await
            .map_err(|e| PipelineError::from(e).temp())?
            .map_err(|e| ResetError::MissingL2Parent(parent_hash, e.to_string()).reset())?
        } else {
            pending_safe_head
        };

        let origin = with_deadline(
            &self.cancel,
            self.fetch_timeout,
            self.l1_provider.block_info_by_hash(pipeline_l2.l1_origin.hash),
        )
        .await
        .map_err(|e| PipelineError::from(e).temp())?
        .map_err(|e| PipelineError::Provider(e.to_string()).temp())?;

        let sys_config = with_deadline(
            &self.cancel,
            self.fetch_timeout,
            self.l2_provider.system_config_by_l2_hash(pipeline_l2.block_info.hash),
        )
        .await
        .map_err(|e| PipelineError::from(e).temp())?
        .map_err(|e| PipelineError::Provider(e.to_string()).temp())?;

        debug!(
            target: "pipeline",
            origin = ?origin.id(),
            l2_block = ?pipeline_l2.id(),
            "Prepared pipeline reset"
        );
        self.origin = Some(origin);
        self.reset_sys_config = Some(sys_config);
        self.reset_l2_safe = Some(pending_safe_head);
        Ok(())
    }

    /// Performs a single step of the stage reset walk.
    async fn reset_step(&mut self, pending_safe_head: L2BlockInfo) -> PipelineResult<StepOutcome> {
        if !self.engine_is_reset {
            return Err(ResetError::EngineNotReset.reset());
        }

        // After the engine has been reset to the canonical chain, the stages still need to be
        // rewound to read all the L1 data for the batches following the safe head.
        if self.reset_l2_safe != Some(pending_safe_head) {
            self.initial_reset(pending_safe_head).await?;
        }

        let (Some(base), Some(cfg)) = (self.origin, self.reset_sys_config) else {
            return Err(PipelineError::MissingOrigin.crit());
        };

        let index = self.resetting;
        let outcome = match self.stages.get_mut(index) {
            Some(stage) => stage.reset(base, &cfg).await,
            None => self.attributes.reset(base, &cfg).await,
        };
        match outcome {
            Ok(StageReset::Done) => {
                debug!(
                    target: "pipeline",
                    stage = index,
                    origin = ?base.id(),
                    "Reset of stage completed"
                );
                self.resetting += 1;
            }
            Ok(StageReset::Continue) => {
                trace!(target: "pipeline", stage = index, "Stage reset in progress");
            }
            Err(err) => {
                error!(target: "pipeline", stage = index, "Stage reset errored: {err}");
                return Err(err);
            }
        }
        Ok(StepOutcome::ResetProgress)
    }

    /// Picks up the origin of the attributes stage, transforming stages on fork boundaries.
    ///
    /// The new origin is only adopted once [Self::verify_new_origin] accepts it.
    async fn update_origin(&mut self) -> PipelineResult<()> {
        let Some(new_origin) = self.attributes.origin() else {
            return Ok(());
        };
        if self.origin == Some(new_origin) {
            return Ok(());
        }

        if let Some(old_origin) = self.origin {
            self.verify_new_origin(old_origin, new_origin).await?;
        }
        let old_origin = self.origin.replace(new_origin);
        self.metrics.record_origin(&new_origin);
        if let Some(old_origin) = old_origin {
            self.transform_stages(old_origin, new_origin);
        }
        Ok(())
    }

    /// Checks that `new_origin` continues the L1 chain the pipeline was deriving from.
    ///
    /// The next block must point at the previous origin, a block at the same height must be the
    /// previous origin, and when origins are skipped the previous origin must still be
    /// canonical. Origins moving backwards are left to the stage reset that follows.
    async fn verify_new_origin(
        &mut self,
        old_origin: BlockInfo,
        new_origin: BlockInfo,
    ) -> PipelineResult<()> {
        if new_origin.number == old_origin.number + 1 {
            crate::ensure!(
                new_origin.parent_hash == old_origin.hash,
                ResetError::ReorgDetected(old_origin.hash, new_origin.parent_hash).reset()
            );
        } else if new_origin.number == old_origin.number {
            crate::ensure!(
                new_origin.hash == old_origin.hash,
                ResetError::ReorgDetected(old_origin.hash, new_origin.hash).reset()
            );
        } else if new_origin.number > old_origin.number + 1 {
            let canonical = with_deadline(
                &self.cancel,
                self.fetch_timeout,
                self.l1_provider.block_info_by_number(old_origin.number),
            )
            .await
            .map_err(|e| PipelineError::from(e).temp())?
            .map_err(|e| PipelineError::Provider(e.to_string()).temp())?;
            crate::ensure!(
                canonical.hash == old_origin.hash,
                ResetError::ReorgDetected(old_origin.hash, canonical.hash).reset()
            );
        }
        Ok(())
    }

    async fn try_step(&mut self, pending_safe_head: L2BlockInfo) -> PipelineResult<StepOutcome> {
        if self.is_resetting() {
            return self.reset_step(pending_safe_head).await;
        }

        self.update_origin().await?;
        match self.attributes.next_attributes(pending_safe_head).await {
            Ok(attributes) => {
                trace!(target: "pipeline", "Prepared L2 attributes: {:?}", attributes);
                Ok(StepOutcome::PreparedAttributes(attributes))
            }
            Err(err) if err.is_eof() => {
                trace!(target: "pipeline", "Pipeline is waiting for more L1 data");
                Ok(StepOutcome::Eof)
            }
            Err(err @ PipelineErrorKind::Temporary(_)) => {
                trace!(
                    target: "pipeline",
                    "Attributes queue step failed due to temporary error: {err}"
                );
                Err(err)
            }
            Err(err) => {
                warn!(target: "pipeline", "Attributes queue step failed: {err}");
                Err(err)
            }
        }
    }
}

impl<S, L1, L2> OriginProvider for DerivationPipeline<S, L1, L2>
where
    S: NextAttributes + OriginProvider + DerivationStage,
    L1: ChainProvider + Debug + Send,
    L2: L2ChainProvider + Debug + Send,
{
    fn origin(&self) -> Option<BlockInfo> {
        self.origin
    }
}

#[async_trait]
impl<S, L1, L2> Pipeline for DerivationPipeline<S, L1, L2>
where
    S: NextAttributes + OriginProvider + DerivationStage,
    L1: ChainProvider + Debug + Send,
    L2: L2ChainProvider + Debug + Send,
{
    /// Attempts to progress the pipeline.
    ///
    /// ## Returns
    ///
    /// [StepOutcome::Eof] is returned if the pipeline is blocked by waiting for new L1 data.
    /// [StepOutcome::ResetProgress] means the pipeline should be stepped again.
    /// A [PipelineErrorKind::Reset] is returned until the engine reset is confirmed.
    async fn step(&mut self, pending_safe_head: L2BlockInfo) -> PipelineResult<StepOutcome> {
        let result = self.try_step(pending_safe_head).await;
        self.metrics.record_step_result(&result);
        result
    }

    fn reset(&mut self) {
        self.resetting = 0;
        self.engine_is_reset = false;
        self.reset_l2_safe = None;
        self.reset_sys_config = None;
    }

    fn confirm_engine_reset(&mut self) {
        self.engine_is_reset = true;
    }

    fn deposits_only_attributes(
        &mut self,
        parent: BlockNumHash,
        derived_from: BlockInfo,
    ) -> PipelineResult<AttributesWithParent> {
        self.attributes.deposits_only_attributes(parent, derived_from)
    }

    fn rollup_config(&self) -> &RollupConfig {
        &self.rollup_config
    }
}

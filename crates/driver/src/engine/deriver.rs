//! The [EngDeriver] processes built payloads and promotes the engine heads.

use crate::{
    BuiltPayload, Deriver, DriverConfig, Emitter, EngineClient, EngineClientError,
    EngineController, EngineError, Event, ResetHeads,
};
use alloy_rpc_types_engine::PayloadStatusEnum;
use async_trait::async_trait;
use core::fmt::Debug;
use rollup_derive::deadline::with_deadline;
use rollup_protocol::{BlockInfo, L2BlockInfo, RollupConfig};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Drives the execution engine through the build lifecycle and the promotion of its heads.
#[derive(Debug)]
pub struct EngDeriver<C, E>
where
    C: EngineClient + Debug,
    E: Emitter + Debug,
{
    /// The rollup config.
    cfg: Arc<RollupConfig>,
    /// The driver config.
    driver_cfg: DriverConfig,
    /// The engine client.
    client: C,
    /// The engine heads.
    controller: EngineController,
    /// The event sink.
    emitter: E,
    /// Cancellation of the driver.
    cancel: CancellationToken,
}

impl<C, E> EngDeriver<C, E>
where
    C: EngineClient + Debug,
    E: Emitter + Debug,
{
    /// Creates a new [EngDeriver].
    pub fn new(
        cfg: Arc<RollupConfig>,
        driver_cfg: DriverConfig,
        client: C,
        emitter: E,
        cancel: CancellationToken,
    ) -> Self {
        Self { cfg, driver_cfg, client, controller: EngineController::default(), emitter, cancel }
    }

    /// Returns the engine heads.
    pub const fn controller(&self) -> &EngineController {
        &self.controller
    }

    /// Returns the engine client.
    pub const fn client(&self) -> &C {
        &self.client
    }

    async fn process_payload(&mut self, payload: &BuiltPayload) {
        let result = with_deadline(
            &self.cancel,
            self.driver_cfg.payload_process_timeout,
            self.client.new_payload(&payload.envelope),
        )
        .await;

        let status = match result {
            Ok(Ok(status)) => status,
            Ok(Err(err)) => return self.temporary(err.into()),
            Err(err) => return self.temporary(err.into()),
        };

        match status.status {
            PayloadStatusEnum::Valid => self.emitter.emit(Event::PayloadSuccess(payload.clone())),
            PayloadStatusEnum::Invalid { validation_error } => self
                .emitter
                .emit(Event::PayloadInvalid { payload: payload.clone(), err: validation_error }),
            other => self.temporary(EngineError::UnexpectedStatus(format!("{other:?}"))),
        }
    }

    fn on_payload_success(&mut self, payload: &BuiltPayload) {
        info!(
            target: "engine",
            block = %payload.block,
            derived = payload.derived_from.is_some(),
            build_time = ?payload.build_started.map(|started| started.elapsed()),
            "Inserted new L2 block"
        );
        self.emitter.emit(Event::PromoteUnsafe { block: payload.block });
        if let Some(derived_from) = payload.derived_from {
            self.emitter.emit(Event::PromotePendingSafe {
                block: payload.block,
                concluding: payload.concluding,
                derived_from,
            });
        }
        self.emitter.emit(Event::TryUpdateEngine);
    }

    fn on_payload_invalid(&mut self, payload: &BuiltPayload, err: &str) {
        warn!(target: "engine", block = %payload.block, "Cannot process invalid payload: {err}");

        let Some(derived_from) = payload.derived_from else {
            return;
        };
        if !self.cfg.is_holocene_active(payload.block.block_info.timestamp) {
            return;
        }
        if payload.is_deposits_only() {
            self.emitter.emit(Event::CriticalError {
                err: format!("deposits-only payload {} was invalid: {err}", payload.block),
            });
            return;
        }
        self.emitter.emit(Event::DepositsOnlyPayloadAttributesRequest {
            parent: payload.block.block_info.parent_id(),
            derived_from,
        });
    }

    fn on_promote_unsafe(&mut self, block: L2BlockInfo) {
        self.controller.set_unsafe_head(block);
        if !self.cfg.is_interop_active(block.block_info.timestamp) {
            self.controller.set_cross_unsafe_head(block);
        }
    }

    fn on_promote_pending_safe(
        &mut self,
        block: L2BlockInfo,
        concluding: bool,
        derived_from: BlockInfo,
    ) {
        // Only promote if not already stale. Rewinds happen through resets, not promotions.
        if block.block_info.number > self.controller.pending_safe_head().block_info.number {
            debug!(target: "engine", block = %block, "Updated pending safe head");
            self.controller.set_pending_safe_head(block);
        }
        if concluding &&
            block.block_info.number > self.controller.local_safe_head().block_info.number
        {
            self.emitter.emit(Event::PromoteLocalSafe { block, derived_from });
        }
    }

    fn on_promote_local_safe(&mut self, block: L2BlockInfo, derived_from: BlockInfo) {
        self.controller.set_local_safe_head(block);
        if !self.cfg.is_interop_active(block.block_info.timestamp) {
            self.emitter.emit(Event::PromoteSafe { block, derived_from });
        }
    }

    fn on_promote_safe(&mut self, block: L2BlockInfo, derived_from: BlockInfo) {
        info!(target: "engine", block = %block, derived_from = %derived_from, "Promoted safe head");
        self.controller.set_safe_head(block);
        self.emitter.emit(Event::SafeDerived { safe: block, derived_from });
        self.emitter.emit(Event::TryUpdateEngine);
    }

    fn on_promote_finalized(&mut self, block: L2BlockInfo) {
        let finalized = self.controller.finalized_head().block_info.number;
        if block.block_info.number < finalized {
            error!(
                target: "engine",
                block = %block,
                finalized,
                "Cannot rewind finality"
            );
            return;
        }
        let safe = self.controller.safe_head().block_info.number;
        if block.block_info.number > safe {
            error!(
                target: "engine",
                block = %block,
                safe,
                "Block must be safe before it can be finalized"
            );
            return;
        }
        info!(target: "engine", block = %block, "Promoted finalized head");
        self.controller.set_finalized_head(block);
        self.emitter.emit(Event::TryUpdateEngine);
    }

    async fn try_update_engine(&mut self) {
        if !self.controller.forkchoice_update_needed() {
            return;
        }

        let state = self.controller.forkchoice_state();
        let result = with_deadline(
            &self.cancel,
            self.driver_cfg.forkchoice_timeout,
            self.client.forkchoice_updated(state),
        )
        .await;

        let status = match result {
            Ok(Ok(status)) => status,
            Ok(Err(EngineClientError::InvalidForkchoiceState(err))) => {
                return self.emitter.emit(Event::Reset {
                    err: format!("forkchoice update was inconsistent: {err}"),
                });
            }
            Ok(Err(err)) => return self.temporary(err.into()),
            Err(err) => return self.temporary(err.into()),
        };

        match status.status {
            PayloadStatusEnum::Invalid { validation_error } => {
                self.emitter.emit(Event::Reset {
                    err: format!("forkchoice update was inconsistent: {validation_error}"),
                });
            }
            PayloadStatusEnum::Valid => {
                self.controller.set_forkchoice_update_needed(false);
                self.emitter.emit(Event::ForkchoiceUpdate {
                    unsafe_head: *self.controller.unsafe_head(),
                    safe_head: *self.controller.safe_head(),
                    finalized_head: *self.controller.finalized_head(),
                });
            }
            other => {
                debug!(
                    target: "engine",
                    status = ?other,
                    "Engine is not ready to apply forkchoice"
                );
                self.controller.set_forkchoice_update_needed(false);
            }
        }
    }

    fn on_force_reset(&mut self, heads: ResetHeads) {
        info!(
            target: "engine",
            unsafe_head = %heads.local_unsafe,
            safe_head = %heads.local_safe,
            finalized_head = %heads.finalized,
            "Force-resetting engine heads"
        );
        self.controller.set_unsafe_head(heads.local_unsafe);
        self.controller.set_cross_unsafe_head(heads.cross_unsafe);
        self.controller.set_pending_safe_head(heads.local_safe);
        self.controller.set_local_safe_head(heads.local_safe);
        self.controller.set_safe_head(heads.cross_safe);
        self.controller.set_finalized_head(heads.finalized);
    }

    fn temporary(&self, err: EngineError) {
        warn!(target: "engine", "Engine temporary error: {err}");
        self.emitter.emit(Event::EngineTemporaryError { err });
    }
}

#[async_trait]
impl<C, E> Deriver for EngDeriver<C, E>
where
    C: EngineClient + Debug,
    E: Emitter + Debug,
{
    async fn on_event(&mut self, event: &Event) -> bool {
        match event {
            Event::BuildStarted { parent, derived_from, .. } => {
                debug!(
                    target: "engine",
                    parent = %parent,
                    derived = derived_from.is_some(),
                    "Block building started"
                );
            }
            Event::BuildSealed(payload) => {
                self.emitter.emit(Event::PayloadProcess(payload.clone()));
            }
            Event::PayloadProcess(payload) => self.process_payload(payload).await,
            Event::PayloadSuccess(payload) => self.on_payload_success(payload),
            Event::PayloadInvalid { payload, err } => self.on_payload_invalid(payload, err),
            Event::PromoteUnsafe { block } => self.on_promote_unsafe(*block),
            Event::PromoteCrossUnsafe { block } => self.controller.set_cross_unsafe_head(*block),
            Event::PromotePendingSafe { block, concluding, derived_from } => {
                self.on_promote_pending_safe(*block, *concluding, *derived_from)
            }
            Event::PromoteLocalSafe { block, derived_from } => {
                self.on_promote_local_safe(*block, *derived_from)
            }
            Event::PromoteSafe { block, derived_from } => {
                self.on_promote_safe(*block, *derived_from)
            }
            Event::PromoteFinalized { block } => self.on_promote_finalized(*block),
            Event::TryUpdateEngine => self.try_update_engine().await,
            Event::ForceReset(heads) => {
                self.on_force_reset(*heads);
                self.emitter.emit(Event::TryUpdateEngine);
                self.emitter.emit(Event::EngineResetConfirmed(*heads));
            }
            Event::PendingSafeRequest => {
                self.emitter.emit(Event::PipelineStep {
                    pending_safe: *self.controller.pending_safe_head(),
                });
            }
            _ => return false,
        }
        true
    }
}

//! The [Finalizer] finalizes L2 blocks once the L1 data they were derived from is finalized.

use crate::{Deriver, DriverConfig, Emitter, Event};
use alloy_eips::BlockNumHash;
use async_trait::async_trait;
use core::{fmt::Debug, time::Duration};
use rollup_derive::{deadline::with_deadline, traits::ChainProvider};
use rollup_protocol::{BlockInfo, L2BlockInfo, RollupConfig};
use spin::Mutex;
use std::{collections::VecDeque, sync::Arc};
use tokio_util::sync::CancellationToken;

/// The last L2 block fully derived from an L1 block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinalityData {
    /// The last L2 block that was fully derived and inserted into the L2 engine while processing
    /// this L1 block.
    pub l2_block: L2BlockInfo,
    /// The L1 block this stage was at when inserting the L2 block.
    pub l1_block: BlockNumHash,
}

/// The state of the [Finalizer], shared with [FinalizerHandle]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizerState {
    /// The latest L1 finality signal.
    finalized_l1: Option<BlockInfo>,
    /// The last L2 block known to be finalized.
    last_finalized_l2: L2BlockInfo,
    /// The derivation origin at the last finalization attempt.
    tried_finalize_at: Option<u64>,
    /// Finality data, ordered by L1 block.
    finality_data: VecDeque<FinalityData>,
    /// The bound on `finality_data`.
    finality_lookback: usize,
    /// See [crate::config::DEFAULT_FINALITY_DELAY].
    finality_delay: u64,
}

impl FinalizerState {
    /// Creates an empty state.
    pub fn new(finality_lookback: usize, finality_delay: u64) -> Self {
        Self {
            finalized_l1: None,
            last_finalized_l2: L2BlockInfo::default(),
            tried_finalize_at: None,
            finality_data: VecDeque::with_capacity(finality_lookback),
            finality_lookback,
            finality_delay,
        }
    }

    /// Returns the latest L1 finality signal.
    pub const fn finalized_l1(&self) -> Option<BlockInfo> {
        self.finalized_l1
    }

    /// Returns the last L2 block known to be finalized.
    pub const fn last_finalized_l2(&self) -> L2BlockInfo {
        self.last_finalized_l2
    }

    /// Returns the buffered finality data.
    pub const fn finality_data(&self) -> &VecDeque<FinalityData> {
        &self.finality_data
    }

    /// Records an L1 finality signal. Returns false if the signal regresses and was ignored.
    pub fn on_l1_finalized(&mut self, block: BlockInfo) -> bool {
        if let Some(prev) = self.finalized_l1 {
            if block.number < prev.number {
                error!(
                    target: "finalizer",
                    prev = %prev,
                    signal = %block,
                    "Ignoring old L1 finalized block signal! Is the L1 provider corrupted?"
                );
                return false;
            }
        }
        if self.finalized_l1 != Some(block) {
            // Give finalization a shot with the new signal.
            self.tried_finalize_at = None;
            self.finalized_l1 = Some(block);
        }
        true
    }

    /// Records that `safe` was fully derived from `derived_from`.
    pub fn on_safe_derived(&mut self, safe: L2BlockInfo, derived_from: BlockInfo) {
        let extends = self
            .finality_data
            .back()
            .map_or(true, |last| last.l1_block.number < derived_from.number);

        if extends {
            if self.finality_data.len() >= self.finality_lookback {
                self.finality_data.pop_front();
            }
            self.finality_data
                .push_back(FinalityData { l2_block: safe, l1_block: derived_from.id() });
            debug!(
                target: "finalizer",
                last_l1 = %derived_from,
                last_l2 = %safe,
                "Extended finality data"
            );
        } else if let Some(last) = self.finality_data.back_mut() {
            if last.l2_block != safe {
                last.l2_block = safe;
                debug!(
                    target: "finalizer",
                    last_l1 = ?last.l1_block,
                    last_l2 = %safe,
                    "Updated finality data"
                );
            }
        }
    }

    /// Returns true if a finalization attempt is due now that derivation is idle at `origin`,
    /// and records the attempt.
    pub fn on_derivation_idle(&mut self, origin: BlockInfo) -> bool {
        if self.finalized_l1.is_none() {
            return false;
        }
        // If we recently tried finalizing, traverse more of L1 before trying again.
        if let Some(tried) = self.tried_finalize_at {
            if origin.number <= tried + self.finality_delay {
                return false;
            }
        }
        debug!(
            target: "finalizer",
            derived_from = %origin,
            previous = ?self.tried_finalize_at,
            "Processing L1 finality information"
        );
        self.tried_finalize_at = Some(origin.number);
        true
    }

    /// Forgets the finality data. The L1 finality signal is kept: it is final after all.
    pub fn on_reset(&mut self) {
        self.finality_data.clear();
        self.tried_finalize_at = None;
    }

    /// Returns the highest L2 block above the last finalized one that was derived from finalized
    /// L1 data, along with the L1 block it was derived from.
    pub fn finality_candidate(&self) -> Option<(L2BlockInfo, BlockNumHash)> {
        let finalized_l1 = self.finalized_l1?;
        let mut candidate = None;
        let mut finalized_number = self.last_finalized_l2.block_info.number;
        for data in self.finality_data.iter() {
            if data.l2_block.block_info.number > finalized_number &&
                data.l1_block.number <= finalized_l1.number
            {
                finalized_number = data.l2_block.block_info.number;
                candidate = Some((data.l2_block, data.l1_block));
            }
        }
        candidate
    }

    /// Records the last finalized L2 block, ignoring rewinds.
    pub fn set_last_finalized_l2(&mut self, block: L2BlockInfo) {
        if block.block_info.number >= self.last_finalized_l2.block_info.number {
            self.last_finalized_l2 = block;
        }
    }
}

/// A cloneable read handle on the [Finalizer], safe to use outside the event loop.
#[derive(Debug, Clone)]
pub struct FinalizerHandle {
    state: Arc<Mutex<FinalizerState>>,
}

impl FinalizerHandle {
    /// Returns the latest L1 finality signal.
    pub fn finalized_l1(&self) -> Option<BlockInfo> {
        self.state.lock().finalized_l1()
    }

    /// Returns a snapshot of the finalizer state.
    pub fn state(&self) -> FinalizerState {
        self.state.lock().clone()
    }
}

/// Tracks which L2 blocks were derived from which L1 blocks, and emits
/// [Event::PromoteFinalized] once the L1 data is finalized.
#[derive(Debug)]
pub struct Finalizer<P, E>
where
    P: ChainProvider + Debug + Send,
    E: Emitter + Debug,
{
    cfg: Arc<RollupConfig>,
    state: Arc<Mutex<FinalizerState>>,
    l1_provider: P,
    emitter: E,
    l1_fetch_timeout: Duration,
    cancel: CancellationToken,
}

impl<P, E> Finalizer<P, E>
where
    P: ChainProvider + Debug + Send,
    E: Emitter + Debug,
{
    /// Creates a new [Finalizer].
    pub fn new(
        cfg: Arc<RollupConfig>,
        driver_cfg: &DriverConfig,
        l1_provider: P,
        emitter: E,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            cfg,
            state: Arc::new(Mutex::new(FinalizerState::new(
                driver_cfg.finality_lookback,
                driver_cfg.finality_delay,
            ))),
            l1_provider,
            emitter,
            l1_fetch_timeout: driver_cfg.l1_fetch_timeout,
            cancel,
        }
    }

    /// Returns a read handle on the finalizer.
    pub fn handle(&self) -> FinalizerHandle {
        FinalizerHandle { state: self.state.clone() }
    }

    /// Returns the latest L1 finality signal.
    pub fn finalized_l1(&self) -> Option<BlockInfo> {
        self.state.lock().finalized_l1()
    }

    /// Fetches the canonical L1 block at `expected.number` and checks it is `expected`.
    ///
    /// Returns false if an event was emitted instead.
    async fn check_canonical(&mut self, expected: BlockNumHash, what: &str) -> bool {
        let result = with_deadline(
            &self.cancel,
            self.l1_fetch_timeout,
            self.l1_provider.block_info_by_number(expected.number),
        )
        .await;
        let canonical = match result {
            Ok(Ok(block)) => block,
            Ok(Err(err)) => {
                self.emitter.emit(Event::L1TemporaryError {
                    err: format!("failed to check if {what} {expected:?} is canonical: {err}"),
                });
                return false;
            }
            Err(err) => {
                self.emitter.emit(Event::L1TemporaryError {
                    err: format!("failed to check if {what} {expected:?} is canonical: {err}"),
                });
                return false;
            }
        };
        if canonical.hash != expected.hash {
            self.emitter.emit(Event::Reset {
                err: format!(
                    "need to reset, we assumed {what} {expected:?} is finalized, \
                     but canonical chain is {}",
                    canonical.hash
                ),
            });
            return false;
        }
        true
    }

    async fn try_finalize(&mut self) {
        let (finalized_l1, candidate) = {
            let state = self.state.lock();
            (state.finalized_l1(), state.finality_candidate())
        };
        let (Some(finalized_l1), Some((block, derived_from))) = (finalized_l1, candidate) else {
            return;
        };

        // The finality signal was checked to be finalized, but the derived-from block may have
        // been reorged out since.
        if !self.check_canonical(finalized_l1.id(), "finalized L1 block").await {
            return;
        }
        if !self.check_canonical(derived_from, "derived-from block").await {
            return;
        }

        // The last finalized L2 block moves on the engine's forkchoice update, not here.
        info!(
            target: "finalizer",
            block = %block,
            derived_from = ?derived_from,
            "Finalizing L2 block"
        );
        self.emitter.emit(Event::PromoteFinalized { block });
    }
}

#[async_trait]
impl<P, E> Deriver for Finalizer<P, E>
where
    P: ChainProvider + Debug + Send,
    E: Emitter + Debug,
{
    async fn on_event(&mut self, event: &Event) -> bool {
        match event {
            Event::FinalizeL1 { block } => {
                self.state.lock().on_l1_finalized(*block);
                self.emitter.emit(Event::TryFinalize);
            }
            Event::SafeDerived { safe, derived_from } => {
                // Cross-safe is how blocks finalize under interop.
                if !self.cfg.is_interop_active(safe.block_info.timestamp) {
                    self.state.lock().on_safe_derived(*safe, *derived_from);
                }
            }
            Event::DeriverIdle { origin } => {
                if self.state.lock().on_derivation_idle(*origin) {
                    self.emitter.emit(Event::TryFinalize);
                }
            }
            Event::TryFinalize => self.try_finalize().await,
            Event::Reset { .. } => {
                self.state.lock().on_reset();
                return false;
            }
            Event::ForkchoiceUpdate { finalized_head, .. } => {
                self.state.lock().set_last_finalized_l2(*finalized_head);
                return false;
            }
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEmitter;
    use alloy_primitives::B256;
    use proptest::prelude::*;
    use rollup_derive::test_utils::TestChainProvider;

    fn l1(number: u64) -> BlockInfo {
        BlockInfo {
            hash: B256::with_last_byte((number as u8).wrapping_add(0xa0)),
            number,
            ..Default::default()
        }
    }

    fn l2(number: u64) -> L2BlockInfo {
        L2BlockInfo {
            block_info: BlockInfo {
                hash: B256::with_last_byte(number as u8),
                number,
                timestamp: number * 2,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn new_finalizer(
        cfg: RollupConfig,
        l1_blocks: &[BlockInfo],
    ) -> (Finalizer<TestChainProvider, TestEmitter>, TestEmitter) {
        let mut provider = TestChainProvider::default();
        for block in l1_blocks {
            provider.insert_block(*block);
        }
        let emitter = TestEmitter::default();
        let finalizer = Finalizer::new(
            Arc::new(cfg),
            &DriverConfig::default(),
            provider,
            emitter.clone(),
            CancellationToken::new(),
        );
        (finalizer, emitter)
    }

    #[tokio::test]
    async fn test_latest_entry_for_l1_block_is_finalized() {
        let (mut finalizer, emitter) = new_finalizer(RollupConfig::default(), &[l1(1)]);
        finalizer.on_event(&Event::SafeDerived { safe: l2(7), derived_from: l1(1) }).await;
        finalizer.on_event(&Event::SafeDerived { safe: l2(9), derived_from: l1(1) }).await;
        assert_eq!(finalizer.state.lock().finality_data().len(), 1);

        finalizer.on_event(&Event::FinalizeL1 { block: l1(1) }).await;
        assert_eq!(emitter.take(), vec![Event::TryFinalize]);
        finalizer.on_event(&Event::TryFinalize).await;
        assert_eq!(emitter.take(), vec![Event::PromoteFinalized { block: l2(9) }]);
        assert_eq!(finalizer.handle().finalized_l1(), Some(l1(1)));
    }

    #[tokio::test]
    async fn test_candidate_retried_until_engine_applies_it() {
        let (mut finalizer, emitter) = new_finalizer(RollupConfig::default(), &[l1(1)]);
        finalizer.on_event(&Event::SafeDerived { safe: l2(9), derived_from: l1(1) }).await;
        finalizer.on_event(&Event::FinalizeL1 { block: l1(1) }).await;
        emitter.take();

        finalizer.on_event(&Event::TryFinalize).await;
        assert_eq!(emitter.take(), vec![Event::PromoteFinalized { block: l2(9) }]);
        assert_eq!(finalizer.state.lock().last_finalized_l2(), L2BlockInfo::default());

        // The engine refused the promotion: no forkchoice update followed.
        finalizer.on_event(&Event::TryFinalize).await;
        assert_eq!(emitter.take(), vec![Event::PromoteFinalized { block: l2(9) }]);

        let applied = Event::ForkchoiceUpdate {
            unsafe_head: l2(10),
            safe_head: l2(9),
            finalized_head: l2(9),
        };
        assert!(!finalizer.on_event(&applied).await);
        assert_eq!(finalizer.state.lock().last_finalized_l2(), l2(9));
        finalizer.on_event(&Event::TryFinalize).await;
        assert!(emitter.take().is_empty());
    }

    #[tokio::test]
    async fn test_nothing_finalized_above_l1_finality() {
        let (mut finalizer, emitter) = new_finalizer(RollupConfig::default(), &[l1(1), l1(2)]);
        finalizer.on_event(&Event::SafeDerived { safe: l2(3), derived_from: l1(2) }).await;
        finalizer.on_event(&Event::FinalizeL1 { block: l1(1) }).await;
        finalizer.on_event(&Event::TryFinalize).await;
        assert_eq!(emitter.take(), vec![Event::TryFinalize]);
    }

    #[tokio::test]
    async fn test_l1_finality_regression_is_ignored() {
        let (mut finalizer, emitter) = new_finalizer(RollupConfig::default(), &[]);
        finalizer.on_event(&Event::FinalizeL1 { block: l1(5) }).await;
        finalizer.on_event(&Event::FinalizeL1 { block: l1(4) }).await;
        assert_eq!(finalizer.finalized_l1(), Some(l1(5)));
        assert_eq!(emitter.take(), vec![Event::TryFinalize, Event::TryFinalize]);
    }

    #[tokio::test]
    async fn test_finality_checks_l1_canonicality() {
        // The derived-from block was reorged out.
        let reorged = BlockInfo { hash: B256::with_last_byte(0xff), ..l1(1) };
        let (mut finalizer, emitter) = new_finalizer(RollupConfig::default(), &[reorged, l1(2)]);
        finalizer.on_event(&Event::SafeDerived { safe: l2(3), derived_from: l1(1) }).await;
        finalizer.on_event(&Event::FinalizeL1 { block: l1(2) }).await;
        emitter.take();

        finalizer.on_event(&Event::TryFinalize).await;
        assert!(matches!(emitter.take()[..], [Event::Reset { .. }]));

        // The L1 provider lost the finalized block.
        finalizer.l1_provider.clear();
        finalizer.on_event(&Event::TryFinalize).await;
        assert!(matches!(emitter.take()[..], [Event::L1TemporaryError { .. }]));
        assert_eq!(finalizer.state.lock().last_finalized_l2(), L2BlockInfo::default());
    }

    #[tokio::test]
    async fn test_idle_retries_after_delay() {
        let (mut finalizer, emitter) = new_finalizer(RollupConfig::default(), &[]);
        finalizer.on_event(&Event::DeriverIdle { origin: l1(10) }).await;
        assert!(emitter.take().is_empty());

        finalizer.on_event(&Event::FinalizeL1 { block: l1(5) }).await;
        emitter.take();
        finalizer.on_event(&Event::DeriverIdle { origin: l1(10) }).await;
        assert_eq!(emitter.take(), vec![Event::TryFinalize]);

        finalizer.on_event(&Event::DeriverIdle { origin: l1(74) }).await;
        assert!(emitter.take().is_empty());
        finalizer.on_event(&Event::DeriverIdle { origin: l1(75) }).await;
        assert_eq!(emitter.take(), vec![Event::TryFinalize]);

        // A new signal allows an immediate attempt.
        finalizer.on_event(&Event::FinalizeL1 { block: l1(6) }).await;
        emitter.take();
        finalizer.on_event(&Event::DeriverIdle { origin: l1(76) }).await;
        assert_eq!(emitter.take(), vec![Event::TryFinalize]);
    }

    #[tokio::test]
    async fn test_reset_clears_finality_data() {
        let (mut finalizer, _) = new_finalizer(RollupConfig::default(), &[]);
        finalizer.on_event(&Event::FinalizeL1 { block: l1(1) }).await;
        finalizer.on_event(&Event::SafeDerived { safe: l2(3), derived_from: l1(2) }).await;

        assert!(!finalizer.on_event(&Event::Reset { err: "reorg".to_string() }).await);
        let state = finalizer.state.lock();
        assert!(state.finality_data().is_empty());
        assert!(state.tried_finalize_at.is_none());
        assert_eq!(state.finalized_l1(), Some(l1(1)));
    }

    #[tokio::test]
    async fn test_forkchoice_update_is_observed() {
        let (mut finalizer, _) = new_finalizer(RollupConfig::default(), &[]);
        let event = Event::ForkchoiceUpdate {
            unsafe_head: l2(9),
            safe_head: l2(8),
            finalized_head: l2(4),
        };
        assert!(!finalizer.on_event(&event).await);
        assert_eq!(finalizer.state.lock().last_finalized_l2(), l2(4));
    }

    #[tokio::test]
    async fn test_safe_derived_skipped_under_interop() {
        let cfg = RollupConfig { interop_time: Some(0), ..Default::default() };
        let (mut finalizer, _) = new_finalizer(cfg, &[]);
        assert!(finalizer.on_event(&Event::SafeDerived { safe: l2(3), derived_from: l1(1) }).await);
        assert!(finalizer.state.lock().finality_data().is_empty());
    }

    #[test]
    fn test_lookback_prunes_oldest() {
        let mut state = FinalizerState::new(3, 64);
        for n in 1..=5 {
            state.on_safe_derived(l2(n * 2), l1(n));
        }
        let l1_numbers: Vec<u64> =
            state.finality_data().iter().map(|d| d.l1_block.number).collect();
        assert_eq!(l1_numbers, vec![3, 4, 5]);
    }

    proptest! {
        #[test]
        fn prop_finality_is_monotonic_and_bounded(
            steps in prop::collection::vec((0u64..3, 0u64..3, any::<bool>()), 1..200),
            lookback in 1usize..20,
        ) {
            let mut state = FinalizerState::new(lookback, 64);
            let (mut l1_number, mut l2_number) = (1u64, 1u64);
            let mut finalized = 0u64;
            for (l1_step, l2_step, finalize) in steps {
                l1_number += l1_step;
                l2_number += l2_step;
                state.on_safe_derived(l2(l2_number), l1(l1_number));
                prop_assert!(state.finality_data().len() <= lookback);

                if finalize {
                    state.on_l1_finalized(l1(l1_number.saturating_sub(1)));
                    if let Some((block, derived_from)) = state.finality_candidate() {
                        prop_assert!(block.block_info.number > finalized);
                        prop_assert!(derived_from.number < l1_number);
                        finalized = block.block_info.number;
                        state.set_last_finalized_l2(block);
                    }
                }
                prop_assert_eq!(state.last_finalized_l2().block_info.number, finalized);
            }
        }
    }
}

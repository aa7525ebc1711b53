//! The [EngineResetDeriver] looks up the L2 heads to restart from when the engine is reset.

use crate::{Deriver, Emitter, Event, ResetHeads, SyncConfig};
use async_trait::async_trait;
use core::fmt::{Debug, Display};
use rollup_protocol::{L2BlockInfo, RollupConfig};
use std::sync::Arc;

/// The heads found by [FindL2Heads].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L2Heads {
    /// The unsafe head.
    pub unsafe_head: L2BlockInfo,
    /// The safe head.
    pub safe_head: L2BlockInfo,
    /// The finalized head.
    pub finalized_head: L2BlockInfo,
}

/// Searches the execution engine and L1 for the L2 heads derivation can restart from.
#[async_trait]
pub trait FindL2Heads: Send {
    /// The error type for the [FindL2Heads].
    type Error: Display + Send;

    /// Walks back from the engine's heads until it finds a consistent set of heads.
    async fn find_l2_heads(
        &mut self,
        cfg: &RollupConfig,
        sync_cfg: &SyncConfig,
    ) -> Result<L2Heads, Self::Error>;
}

/// Answers [Event::ResetEngineRequest] by force-resetting the engine to the heads found by
/// [FindL2Heads].
///
/// Cross heads are collapsed onto the local ones: before interop there is no cross-chain
/// dependency to verify. Interop-aware callers emit their own [Event::ForceReset].
#[derive(Debug)]
pub struct EngineResetDeriver<F, E>
where
    F: FindL2Heads + Debug,
    E: Emitter + Debug,
{
    cfg: Arc<RollupConfig>,
    sync_cfg: SyncConfig,
    finder: F,
    emitter: E,
}

impl<F, E> EngineResetDeriver<F, E>
where
    F: FindL2Heads + Debug,
    E: Emitter + Debug,
{
    /// Creates a new [EngineResetDeriver].
    pub const fn new(cfg: Arc<RollupConfig>, sync_cfg: SyncConfig, finder: F, emitter: E) -> Self {
        Self { cfg, sync_cfg, finder, emitter }
    }
}

#[async_trait]
impl<F, E> Deriver for EngineResetDeriver<F, E>
where
    F: FindL2Heads + Debug,
    E: Emitter + Debug,
{
    async fn on_event(&mut self, event: &Event) -> bool {
        if !matches!(event, Event::ResetEngineRequest) {
            return false;
        }

        match self.finder.find_l2_heads(&self.cfg, &self.sync_cfg).await {
            Ok(heads) => {
                info!(
                    target: "engine-reset",
                    unsafe_head = %heads.unsafe_head,
                    safe_head = %heads.safe_head,
                    finalized_head = %heads.finalized_head,
                    "Found L2 heads to reset to"
                );
                self.emitter.emit(Event::ForceReset(ResetHeads {
                    local_unsafe: heads.unsafe_head,
                    cross_unsafe: heads.unsafe_head,
                    local_safe: heads.safe_head,
                    cross_safe: heads.safe_head,
                    finalized: heads.finalized_head,
                }));
            }
            Err(err) => {
                warn!(target: "engine-reset", "Failed to find the L2 heads to reset to: {err}");
                self.emitter.emit(Event::Reset {
                    err: format!("failed to find the L2 heads to start from: {err}"),
                });
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestEmitter, TestFindL2Heads};
    use alloy_primitives::B256;
    use rollup_protocol::BlockInfo;

    fn l2(number: u64) -> L2BlockInfo {
        L2BlockInfo {
            block_info: BlockInfo {
                hash: B256::with_last_byte(number as u8),
                number,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_reset_request_emits_single_force_reset() {
        let finder = TestFindL2Heads::new(Ok(L2Heads {
            unsafe_head: l2(10),
            safe_head: l2(8),
            finalized_head: l2(5),
        }));
        let emitter = TestEmitter::default();
        let mut deriver = EngineResetDeriver::new(
            Arc::new(RollupConfig::default()),
            SyncConfig::default(),
            finder,
            emitter.clone(),
        );

        assert!(deriver.on_event(&Event::ResetEngineRequest).await);
        assert_eq!(
            emitter.take(),
            vec![Event::ForceReset(ResetHeads {
                local_unsafe: l2(10),
                cross_unsafe: l2(10),
                local_safe: l2(8),
                cross_safe: l2(8),
                finalized: l2(5),
            })]
        );
        assert_eq!(deriver.finder.calls, 1);
    }

    #[tokio::test]
    async fn test_reset_request_failure_emits_reset() {
        let emitter = TestEmitter::default();
        let mut deriver = EngineResetDeriver::new(
            Arc::new(RollupConfig::default()),
            SyncConfig::default(),
            TestFindL2Heads::new(Err("engine unavailable".to_string())),
            emitter.clone(),
        );

        assert!(deriver.on_event(&Event::ResetEngineRequest).await);
        assert_eq!(
            emitter.take(),
            vec![Event::Reset {
                err: "failed to find the L2 heads to start from: engine unavailable".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_other_events_ignored() {
        let emitter = TestEmitter::default();
        let mut deriver = EngineResetDeriver::new(
            Arc::new(RollupConfig::default()),
            SyncConfig::default(),
            TestFindL2Heads::default(),
            emitter.clone(),
        );
        assert!(!deriver.on_event(&Event::TryFinalize).await);
        assert_eq!(deriver.finder.calls, 0);
        assert!(emitter.take().is_empty());
    }
}

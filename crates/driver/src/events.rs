//! The events exchanged between derivers.

use crate::EngineError;
use alloy_eips::BlockNumHash;
use rollup_protocol::{AttributesWithParent, BlockInfo, ExecutionPayloadEnvelope, L2BlockInfo};
use std::time::Instant;

/// A sink for [Event]s.
///
/// Emitting only enqueues: the event is dispatched once the driver reaches it.
pub trait Emitter: Send + Sync {
    /// Enqueues an event.
    fn emit(&self, event: Event);
}

/// A payload built by the execution engine, together with its derivation metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPayload {
    /// The sealed payload.
    pub envelope: ExecutionPayloadEnvelope,
    /// The block reference of the payload.
    pub block: L2BlockInfo,
    /// Whether the payload concludes the span of batches it was derived from.
    pub concluding: bool,
    /// The L1 block the payload was derived from. `None` for sequenced or gossiped payloads.
    pub derived_from: Option<BlockInfo>,
    /// When building started, if the payload was built locally.
    pub build_started: Option<Instant>,
}

impl BuiltPayload {
    /// Returns true if the payload contains deposit transactions only.
    pub fn is_deposits_only(&self) -> bool {
        self.envelope
            .execution_payload
            .transactions
            .iter()
            .all(rollup_protocol::is_deposit_transaction)
    }
}

/// The heads a [Event::ForceReset] installs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetHeads {
    /// The local unsafe head.
    pub local_unsafe: L2BlockInfo,
    /// The cross-unsafe head.
    pub cross_unsafe: L2BlockInfo,
    /// The local safe head.
    pub local_safe: L2BlockInfo,
    /// The cross-safe head.
    pub cross_safe: L2BlockInfo,
    /// The finalized head.
    pub finalized: L2BlockInfo,
}

/// Every event known to the derivation core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The engine must be reset before derivation can continue.
    ResetEngineRequest,
    /// Overwrite every engine head.
    ForceReset(ResetHeads),
    /// The engine was reset to the given heads.
    EngineResetConfirmed(ResetHeads),
    /// Something requires derivation to restart from the engine's safe chain.
    Reset {
        /// The cause of the reset.
        err: String,
    },
    /// Derivation cannot continue.
    CriticalError {
        /// The cause of the failure.
        err: String,
    },

    /// Ask the engine for its pending safe head, to step the pipeline upon it.
    PendingSafeRequest,
    /// Step the pipeline upon the given pending safe head.
    PipelineStep {
        /// The pending safe head.
        pending_safe: L2BlockInfo,
    },
    /// The pipeline derived the next payload attributes.
    DerivedAttributes {
        /// The attributes.
        attributes: AttributesWithParent,
    },
    /// The consumer of [Event::DerivedAttributes] took the attributes.
    ConfirmReceivedAttributes,
    /// The pipeline needs more L1 data before it can derive further.
    DeriverIdle {
        /// The L1 block the pipeline is stuck at.
        origin: BlockInfo,
    },
    /// The pipeline failed temporarily.
    DeriverTemporaryError {
        /// The cause of the failure.
        err: String,
    },
    /// Re-derive the last attributes with every non-deposit transaction stripped.
    DepositsOnlyPayloadAttributesRequest {
        /// The parent of the rejected payload.
        parent: BlockNumHash,
        /// The L1 block the rejected payload was derived from.
        derived_from: BlockInfo,
    },

    /// The engine started building a block.
    BuildStarted {
        /// The parent of the block.
        parent: L2BlockInfo,
        /// Whether the block concludes its span of batches.
        concluding: bool,
        /// The L1 block the attributes were derived from.
        derived_from: Option<BlockInfo>,
    },
    /// The engine sealed a block.
    BuildSealed(BuiltPayload),
    /// Insert a payload into the engine.
    PayloadProcess(BuiltPayload),
    /// The engine accepted a payload.
    PayloadSuccess(BuiltPayload),
    /// The engine rejected a payload.
    PayloadInvalid {
        /// The rejected payload.
        payload: BuiltPayload,
        /// The validation error reported by the engine.
        err: String,
    },
    /// The engine failed temporarily.
    EngineTemporaryError {
        /// The cause of the failure.
        err: EngineError,
    },

    /// Promote a block to the unsafe head.
    PromoteUnsafe {
        /// The block.
        block: L2BlockInfo,
    },
    /// Promote a block to the cross-unsafe head.
    PromoteCrossUnsafe {
        /// The block.
        block: L2BlockInfo,
    },
    /// Promote a derived block to the pending safe head.
    PromotePendingSafe {
        /// The block.
        block: L2BlockInfo,
        /// Whether the block concludes its span of batches.
        concluding: bool,
        /// The L1 block the block was derived from.
        derived_from: BlockInfo,
    },
    /// Promote a derived block to the local safe head.
    PromoteLocalSafe {
        /// The block.
        block: L2BlockInfo,
        /// The L1 block the block was derived from.
        derived_from: BlockInfo,
    },
    /// Promote a derived block to the safe head.
    PromoteSafe {
        /// The block.
        block: L2BlockInfo,
        /// The L1 block the block was derived from.
        derived_from: BlockInfo,
    },
    /// A block became safe.
    SafeDerived {
        /// The new safe head.
        safe: L2BlockInfo,
        /// The L1 block it was derived from.
        derived_from: BlockInfo,
    },
    /// Promote a block to the finalized head.
    PromoteFinalized {
        /// The block.
        block: L2BlockInfo,
    },
    /// Send the engine a forkchoice update if the heads changed.
    TryUpdateEngine,
    /// The engine accepted a forkchoice update.
    ForkchoiceUpdate {
        /// The unsafe head.
        unsafe_head: L2BlockInfo,
        /// The safe head.
        safe_head: L2BlockInfo,
        /// The finalized head.
        finalized_head: L2BlockInfo,
    },

    /// A new L1 finality signal.
    FinalizeL1 {
        /// The finalized L1 block.
        block: BlockInfo,
    },
    /// Finalize the highest L2 block derived from finalized L1 data.
    TryFinalize,
    /// An L1 lookup failed temporarily.
    L1TemporaryError {
        /// The cause of the failure.
        err: String,
    },
}

impl Event {
    /// Returns the name of the event, for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ResetEngineRequest => "reset-engine-request",
            Self::ForceReset(_) => "force-reset",
            Self::EngineResetConfirmed(_) => "engine-reset-confirmed",
            Self::Reset { .. } => "reset",
            Self::CriticalError { .. } => "critical-error",
            Self::PendingSafeRequest => "pending-safe-request",
            Self::PipelineStep { .. } => "pipeline-step",
            Self::DerivedAttributes { .. } => "derived-attributes",
            Self::ConfirmReceivedAttributes => "confirm-received-attributes",
            Self::DeriverIdle { .. } => "deriver-idle",
            Self::DeriverTemporaryError { .. } => "deriver-temporary-error",
            Self::DepositsOnlyPayloadAttributesRequest { .. } => {
                "deposits-only-payload-attributes-request"
            }
            Self::BuildStarted { .. } => "build-started",
            Self::BuildSealed(_) => "build-sealed",
            Self::PayloadProcess(_) => "payload-process",
            Self::PayloadSuccess(_) => "payload-success",
            Self::PayloadInvalid { .. } => "payload-invalid",
            Self::EngineTemporaryError { .. } => "engine-temporary-error",
            Self::PromoteUnsafe { .. } => "promote-unsafe",
            Self::PromoteCrossUnsafe { .. } => "promote-cross-unsafe",
            Self::PromotePendingSafe { .. } => "promote-pending-safe",
            Self::PromoteLocalSafe { .. } => "promote-local-safe",
            Self::PromoteSafe { .. } => "promote-safe",
            Self::SafeDerived { .. } => "safe-derived",
            Self::PromoteFinalized { .. } => "promote-finalized",
            Self::TryUpdateEngine => "try-update-engine",
            Self::ForkchoiceUpdate { .. } => "forkchoice-update",
            Self::FinalizeL1 { .. } => "finalize-l1",
            Self::TryFinalize => "try-finalize",
            Self::L1TemporaryError { .. } => "l1-temporary-error",
        }
    }
}

impl core::fmt::Display for Event {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Bytes;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::ResetEngineRequest.name(), "reset-engine-request");
        assert_eq!(Event::TryFinalize.to_string(), "try-finalize");
        assert_eq!(Event::Reset { err: "x".to_string() }.name(), "reset");
    }

    #[test]
    fn test_is_deposits_only() {
        let mut payload = BuiltPayload {
            envelope: ExecutionPayloadEnvelope::default(),
            block: L2BlockInfo::default(),
            concluding: false,
            derived_from: None,
            build_started: None,
        };
        payload.envelope.execution_payload.transactions = vec![Bytes::from(vec![0x7e, 0x01])];
        assert!(payload.is_deposits_only());

        payload.envelope.execution_payload.transactions.push(Bytes::from(vec![0x02, 0x01]));
        assert!(!payload.is_deposits_only());
    }
}

//! Contains the heads of the execution engine, relative to their [SafetyLevel]s.

use alloy_rpc_types_engine::ForkchoiceState;
use rollup_protocol::{L2BlockInfo, SafetyLevel};

/// Keeps track of the heads of the L2 chain in the execution engine.
///
/// The pending safe head is the last block derived from L1, before the span of batches it
/// belongs to is concluded and the block becomes local safe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineController {
    /// The L2 unsafe tip.
    unsafe_head: L2BlockInfo,
    /// The L2 cross-unsafe tip.
    cross_unsafe_head: L2BlockInfo,
    /// The L2 pending safe tip.
    pending_safe_head: L2BlockInfo,
    /// The L2 local safe tip.
    local_safe_head: L2BlockInfo,
    /// The L2 (cross-)safe tip.
    safe_head: L2BlockInfo,
    /// The finalized tip.
    finalized_head: L2BlockInfo,
    /// Whether the heads changed since the last forkchoice update.
    forkchoice_update_needed: bool,
}

impl EngineController {
    /// Constructs a new [EngineController] with the same head for all levels.
    pub const fn new_unified(head: L2BlockInfo) -> Self {
        Self {
            unsafe_head: head,
            cross_unsafe_head: head,
            pending_safe_head: head,
            local_safe_head: head,
            safe_head: head,
            finalized_head: head,
            forkchoice_update_needed: false,
        }
    }

    /// Returns the head at the given [SafetyLevel].
    pub const fn head(&self, level: SafetyLevel) -> &L2BlockInfo {
        match level {
            SafetyLevel::Unsafe => &self.unsafe_head,
            SafetyLevel::CrossUnsafe => &self.cross_unsafe_head,
            SafetyLevel::LocalSafe => &self.local_safe_head,
            SafetyLevel::Safe => &self.safe_head,
            SafetyLevel::Finalized => &self.finalized_head,
        }
    }

    /// Returns the L2 unsafe head.
    pub const fn unsafe_head(&self) -> &L2BlockInfo {
        &self.unsafe_head
    }

    /// Returns the L2 cross-unsafe head.
    pub const fn cross_unsafe_head(&self) -> &L2BlockInfo {
        &self.cross_unsafe_head
    }

    /// Returns the L2 pending safe head.
    pub const fn pending_safe_head(&self) -> &L2BlockInfo {
        &self.pending_safe_head
    }

    /// Returns the L2 local safe head.
    pub const fn local_safe_head(&self) -> &L2BlockInfo {
        &self.local_safe_head
    }

    /// Returns the L2 safe head.
    pub const fn safe_head(&self) -> &L2BlockInfo {
        &self.safe_head
    }

    /// Returns the finalized head.
    pub const fn finalized_head(&self) -> &L2BlockInfo {
        &self.finalized_head
    }

    /// Returns true if the heads changed since the last forkchoice update.
    pub const fn forkchoice_update_needed(&self) -> bool {
        self.forkchoice_update_needed
    }

    /// Sets the unsafe head.
    pub fn set_unsafe_head(&mut self, head: L2BlockInfo) {
        self.unsafe_head = head;
        self.forkchoice_update_needed = true;
    }

    /// Sets the cross-unsafe head. Not part of the forkchoice state.
    pub fn set_cross_unsafe_head(&mut self, head: L2BlockInfo) {
        self.cross_unsafe_head = head;
    }

    /// Sets the pending safe head. Not part of the forkchoice state.
    pub fn set_pending_safe_head(&mut self, head: L2BlockInfo) {
        self.pending_safe_head = head;
    }

    /// Sets the local safe head. Not part of the forkchoice state.
    pub fn set_local_safe_head(&mut self, head: L2BlockInfo) {
        self.local_safe_head = head;
    }

    /// Sets the safe head.
    pub fn set_safe_head(&mut self, head: L2BlockInfo) {
        self.safe_head = head;
        self.forkchoice_update_needed = true;
    }

    /// Sets the finalized head.
    pub fn set_finalized_head(&mut self, head: L2BlockInfo) {
        self.finalized_head = head;
        self.forkchoice_update_needed = true;
    }

    /// Marks the forkchoice state as sent, or as needing to be sent.
    pub fn set_forkchoice_update_needed(&mut self, needed: bool) {
        self.forkchoice_update_needed = needed;
    }

    /// Returns the [ForkchoiceState] of the current heads.
    pub const fn forkchoice_state(&self) -> ForkchoiceState {
        ForkchoiceState {
            head_block_hash: self.unsafe_head.block_info.hash,
            safe_block_hash: self.safe_head.block_info.hash,
            finalized_block_hash: self.finalized_head.block_info.hash,
        }
    }
}

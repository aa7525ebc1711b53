//! Execution payloads as handed to the engine.

use crate::BlockInfo;
use alloc::vec::Vec;
use alloy_eips::{eip4895::Withdrawal, BlockNumHash};
use alloy_primitives::{Address, Bytes, B256, U256};

/// A sealed L2 block in engine API form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ExecutionPayload {
    /// The parent block hash.
    pub parent_hash: B256,
    /// The fee recipient.
    pub fee_recipient: Address,
    /// The post-state root.
    pub state_root: B256,
    /// The receipts root.
    pub receipts_root: B256,
    /// The previous randao value.
    pub prev_randao: B256,
    /// The block number.
    pub block_number: u64,
    /// The gas limit.
    pub gas_limit: u64,
    /// The gas used.
    pub gas_used: u64,
    /// The block timestamp.
    pub timestamp: u64,
    /// The extra data.
    pub extra_data: Bytes,
    /// The base fee per gas.
    pub base_fee_per_gas: U256,
    /// The block hash.
    pub block_hash: B256,
    /// The EIP-2718 encoded transactions.
    pub transactions: Vec<Bytes>,
    /// The withdrawals, enabled with V2.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub withdrawals: Option<Vec<Withdrawal>>,
}

impl ExecutionPayload {
    /// Returns the block ID of the payload.
    pub const fn block_id(&self) -> BlockNumHash {
        BlockNumHash { hash: self.block_hash, number: self.block_number }
    }

    /// Returns the block ID of the payload's parent.
    pub const fn parent_id(&self) -> BlockNumHash {
        BlockNumHash { hash: self.parent_hash, number: self.block_number.saturating_sub(1) }
    }

    /// Returns the [BlockInfo] header summary of the payload.
    pub const fn block_info(&self) -> BlockInfo {
        BlockInfo::new(self.block_hash, self.block_number, self.parent_hash, self.timestamp)
    }
}

/// An [ExecutionPayload] together with the parent beacon block root it commits to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ExecutionPayloadEnvelope {
    /// The parent beacon block root, set from Ecotone onwards.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub parent_beacon_block_root: Option<B256>,
    /// The execution payload.
    pub execution_payload: ExecutionPayload,
}

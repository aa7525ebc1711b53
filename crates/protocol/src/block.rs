//! L1 and L2 block references.

use alloy_eips::BlockNumHash;
use alloy_primitives::B256;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Block Header Info
///
/// A compact reference to an L1 block: enough to identify it, link it to its parent and order it
/// in time.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct BlockInfo {
    /// The block hash
    pub hash: B256,
    /// The block number
    pub number: u64,
    /// The parent block hash
    pub parent_hash: B256,
    /// The block timestamp
    pub timestamp: u64,
}

impl BlockInfo {
    /// Instantiates a new [BlockInfo].
    pub const fn new(hash: B256, number: u64, parent_hash: B256, timestamp: u64) -> Self {
        Self { hash, number, parent_hash, timestamp }
    }

    /// Returns the block ID.
    pub const fn id(&self) -> BlockNumHash {
        BlockNumHash { hash: self.hash, number: self.number }
    }

    /// Returns the ID of the parent block.
    pub const fn parent_id(&self) -> BlockNumHash {
        BlockNumHash { hash: self.parent_hash, number: self.number.saturating_sub(1) }
    }
}

impl core::fmt::Display for BlockInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "BlockInfo {{ hash: {}, number: {}, parent_hash: {}, timestamp: {} }}",
            self.hash, self.number, self.parent_hash, self.timestamp
        )
    }
}

/// L2 Block Header Info
///
/// An L2 block reference additionally records the L1 block its epoch was derived from, and the
/// distance to the first L2 block of that epoch.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct L2BlockInfo {
    /// The base [BlockInfo]
    pub block_info: BlockInfo,
    /// The L1 origin [BlockNumHash]
    #[cfg_attr(feature = "serde", serde(rename = "l1origin"))]
    pub l1_origin: BlockNumHash,
    /// The sequence number of the L2 block
    #[cfg_attr(feature = "serde", serde(rename = "sequenceNumber"))]
    pub seq_num: u64,
}

impl L2BlockInfo {
    /// Instantiates a new [L2BlockInfo].
    pub const fn new(block_info: BlockInfo, l1_origin: BlockNumHash, seq_num: u64) -> Self {
        Self { block_info, l1_origin, seq_num }
    }

    /// Returns the block ID.
    pub const fn id(&self) -> BlockNumHash {
        self.block_info.id()
    }

    /// Returns the ID of the parent block.
    pub const fn parent_id(&self) -> BlockNumHash {
        self.block_info.parent_id()
    }
}

impl core::fmt::Display for L2BlockInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "L2BlockInfo {{ hash: {}, number: {}, l1_origin: {}, seq_num: {} }}",
            self.block_info.hash, self.block_info.number, self.l1_origin.number, self.seq_num
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn test_parent_id_at_genesis() {
        let info = BlockInfo::new(B256::with_last_byte(1), 0, B256::ZERO, 0);
        assert_eq!(info.parent_id(), BlockNumHash { hash: B256::ZERO, number: 0 });
    }

    #[test]
    fn test_l2_block_info_ids() {
        let hash = b256!("0000000000000000000000000000000000000000000000000000000000000009");
        let parent = B256::with_last_byte(8);
        let info = L2BlockInfo::new(
            BlockInfo::new(hash, 9, parent, 18),
            BlockNumHash { hash: B256::with_last_byte(3), number: 3 },
            1,
        );
        assert_eq!(info.id(), BlockNumHash { hash, number: 9 });
        assert_eq!(info.parent_id(), BlockNumHash { hash: parent, number: 8 });
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_l2_block_info_serde_field_names() {
        let info = L2BlockInfo::default();
        let json = serde_json::to_value(info).unwrap();
        assert!(json.get("l1origin").is_some());
        assert!(json.get("sequenceNumber").is_some());
    }
}

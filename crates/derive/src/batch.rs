//! This module contains the [SingleBatch] type.

use alloc::vec::Vec;
use alloy_eips::BlockNumHash;
use alloy_primitives::{BlockHash, Bytes};
use rollup_protocol::is_deposit_transaction;

/// Represents a single batch: a single encoded L2 block, as decoded from L1 data by the batch
/// stages that precede the attributes queue.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SingleBatch {
    /// Block hash of the previous L2 block
    pub parent_hash: BlockHash,
    /// The batch epoch number. Same as the first L1 block number in the epoch.
    pub epoch_num: u64,
    /// The block hash of the first L1 block in the epoch
    pub epoch_hash: BlockHash,
    /// The L2 block timestamp of this batch
    pub timestamp: u64,
    /// The L2 block transactions in this batch
    pub transactions: Vec<Bytes>,
}

impl SingleBatch {
    /// If any transactions are empty or deposited transaction types.
    pub fn has_invalid_transactions(&self) -> bool {
        self.transactions.iter().any(|tx| tx.is_empty() || is_deposit_transaction(tx))
    }

    /// Returns the [BlockNumHash] of the batch epoch.
    pub const fn epoch(&self) -> BlockNumHash {
        BlockNumHash { number: self.epoch_num, hash: self.epoch_hash }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;

    #[test]
    fn test_has_invalid_transactions() {
        let mut batch = SingleBatch {
            transactions: vec![Bytes::from(vec![0x02, 0x01])],
            ..Default::default()
        };
        assert!(!batch.has_invalid_transactions());

        batch.transactions.push(Bytes::new());
        assert!(batch.has_invalid_transactions());

        batch.transactions = vec![Bytes::from(vec![0x7e, 0x01])];
        assert!(batch.has_invalid_transactions());
    }

    #[test]
    fn test_epoch() {
        let batch =
            SingleBatch { epoch_num: 4, epoch_hash: B256::with_last_byte(4), ..Default::default() };
        assert_eq!(batch.epoch(), BlockNumHash { number: 4, hash: B256::with_last_byte(4) });
    }
}

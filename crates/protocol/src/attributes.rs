//! Payload attributes produced by derivation, and the parent they build on.

use crate::{BlockInfo, L2BlockInfo};
use alloc::vec::Vec;
use alloy_eips::eip4895::Withdrawal;
use alloy_primitives::{Address, Bytes, B256, B64};
use op_alloy_consensus::OpTxType;

/// Returns true if the encoded transaction is a deposit transaction.
///
/// Deposits are identified by their EIP-2718 type byte. Empty payloads are never deposits.
pub fn is_deposit_transaction(tx: &Bytes) -> bool {
    tx.first().is_some_and(|ty| *ty == OpTxType::Deposit as u8)
}

/// The inputs the execution engine needs to build an L2 block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PayloadAttributes {
    /// Value for the timestamp field of the new payload.
    pub timestamp: u64,
    /// Value for the random field of the new payload.
    pub prev_randao: B256,
    /// Suggested value for the coinbase field of the new payload.
    pub suggested_fee_recipient: Address,
    /// Array of [`Withdrawal`] enabled with V2.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub withdrawals: Option<Vec<Withdrawal>>,
    /// Root of the parent beacon block enabled with V3.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub parent_beacon_block_root: Option<B256>,
    /// Transactions to force into the block, in order. Deposits always come first.
    #[cfg_attr(feature = "serde", serde(default))]
    pub transactions: Vec<Bytes>,
    /// If true, the engine must not pull additional transactions from its pool.
    #[cfg_attr(feature = "serde", serde(default))]
    pub no_tx_pool: bool,
    /// The gas limit of the block, when set by the system config.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub gas_limit: Option<u64>,
    /// EIP-1559 parameters, set from Holocene onwards.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub eip_1559_params: Option<B64>,
}

impl PayloadAttributes {
    /// Returns the number of deposit transactions in the attributes.
    pub fn deposit_count(&self) -> usize {
        self.transactions.iter().filter(|tx| is_deposit_transaction(tx)).count()
    }

    /// Returns a copy of the attributes with every non-deposit transaction removed.
    pub fn deposits_only(&self) -> Self {
        Self {
            transactions: self
                .transactions
                .iter()
                .filter(|tx| is_deposit_transaction(tx))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }
}

/// [PayloadAttributes] together with the L2 block they build on top of.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributesWithParent {
    /// The payload attributes.
    pub attributes: PayloadAttributes,
    /// The parent block reference.
    pub parent: L2BlockInfo,
    /// Whether these attributes complete the batch (or span) they were derived from. Only
    /// concluding blocks may be promoted from pending-safe to local-safe.
    pub concluding: bool,
    /// The L1 block the attributes were derived from.
    pub derived_from: Option<BlockInfo>,
}

impl AttributesWithParent {
    /// Create a new [AttributesWithParent] instance.
    pub const fn new(
        attributes: PayloadAttributes,
        parent: L2BlockInfo,
        concluding: bool,
        derived_from: Option<BlockInfo>,
    ) -> Self {
        Self { attributes, parent, concluding, derived_from }
    }

    /// Returns a copy with every non-deposit transaction stripped from the attributes.
    pub fn with_deposits_only(&self) -> Self {
        Self { attributes: self.attributes.deposits_only(), ..self.clone() }
    }
}

//! This module contains the [SystemConfig] type.

use alloy_primitives::{Address, U256};

/// Optimism system config contract values.
///
/// The config is read from L1 and attached to the L2 block it was effective for. The derivation
/// pipeline resets its stages against the config of the block it rewinds to.
#[derive(Debug, Copy, Clone, Default, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SystemConfig {
    /// Batcher address
    pub batcher_address: Address,
    /// Fee overhead value
    pub overhead: U256,
    /// Fee scalar value
    pub scalar: U256,
    /// Gas limit value
    pub gas_limit: u64,
    /// Base fee scalar value, set from Ecotone onwards.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub base_fee_scalar: Option<u64>,
    /// Blob base fee scalar value, set from Ecotone onwards.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub blob_base_fee_scalar: Option<u64>,
    /// EIP-1559 denominator, set from Holocene onwards.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub eip1559_denominator: Option<u32>,
    /// EIP-1559 elasticity, set from Holocene onwards.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub eip1559_elasticity: Option<u32>,
}

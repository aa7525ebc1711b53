//! Chain providers for the derivation pipeline.

use alloy_primitives::B256;
use alloc::boxed::Box;
use async_trait::async_trait;
use core::fmt::Display;
use rollup_protocol::{BlockInfo, L2BlockInfo, SystemConfig};

/// Describes the functionality of a data source that can provide information from the L1 chain.
#[async_trait]
pub trait ChainProvider {
    /// The error type for the [ChainProvider].
    type Error: Display + Send;

    /// Returns the block with the given hash, or an error if the block does not exist in the data
    /// source.
    async fn block_info_by_hash(&mut self, hash: B256) -> Result<BlockInfo, Self::Error>;

    /// Returns the canonical block at the given number, or an error if the block does not exist
    /// in the data source.
    async fn block_info_by_number(&mut self, number: u64) -> Result<BlockInfo, Self::Error>;
}

/// Describes the functionality of a data source that fetches safe blocks.
#[async_trait]
pub trait L2ChainProvider {
    /// The error type for the [L2ChainProvider].
    type Error: Display + Send;

    /// Returns the [L2BlockInfo] of the block with the given hash.
    async fn l2_block_info_by_hash(&mut self, hash: B256) -> Result<L2BlockInfo, Self::Error>;

    /// Returns the [SystemConfig] that was effective for the L2 block with the given hash.
    async fn system_config_by_l2_hash(&mut self, hash: B256)
        -> Result<SystemConfig, Self::Error>;
}

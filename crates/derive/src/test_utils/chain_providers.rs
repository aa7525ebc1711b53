//! Test Utilities for chain provider traits

use crate::traits::{ChainProvider, L2ChainProvider};
use alloy_primitives::B256;
use anyhow::anyhow;
use async_trait::async_trait;
use rollup_protocol::{BlockInfo, L2BlockInfo, SystemConfig};
use std::collections::HashMap;

/// A mock L1 chain provider for testing.
///
/// Blocks are canonical by number: inserting a block at an occupied height replaces the old one,
/// which is how tests simulate an L1 reorg.
#[derive(Debug, Clone, Default)]
pub struct TestChainProvider {
    /// The canonical blocks.
    pub blocks: Vec<BlockInfo>,
}

impl TestChainProvider {
    /// Insert a block into the mock chain provider.
    pub fn insert_block(&mut self, block: BlockInfo) {
        self.blocks.retain(|b| b.number != block.number);
        self.blocks.push(block);
    }

    /// Clears blocks from the mock chain provider.
    pub fn clear(&mut self) {
        self.blocks.clear();
    }
}

#[async_trait]
impl ChainProvider for TestChainProvider {
    type Error = anyhow::Error;

    async fn block_info_by_hash(&mut self, hash: B256) -> Result<BlockInfo, Self::Error> {
        self.blocks
            .iter()
            .find(|b| b.hash == hash)
            .copied()
            .ok_or_else(|| anyhow!("Block not found"))
    }

    async fn block_info_by_number(&mut self, number: u64) -> Result<BlockInfo, Self::Error> {
        self.blocks
            .iter()
            .find(|b| b.number == number)
            .copied()
            .ok_or_else(|| anyhow!("Block not found"))
    }
}

/// A mock L2 chain provider for testing.
#[derive(Debug, Clone, Default)]
pub struct TestL2ChainProvider {
    /// Safe blocks by hash.
    pub blocks: HashMap<B256, L2BlockInfo>,
    /// System configs by L2 block hash.
    pub system_configs: HashMap<B256, SystemConfig>,
}

impl TestL2ChainProvider {
    /// Inserts a block together with the [SystemConfig] effective for it.
    pub fn insert_block(&mut self, block: L2BlockInfo, system_config: SystemConfig) {
        self.blocks.insert(block.block_info.hash, block);
        self.system_configs.insert(block.block_info.hash, system_config);
    }
}

#[async_trait]
impl L2ChainProvider for TestL2ChainProvider {
    type Error = anyhow::Error;

    async fn l2_block_info_by_hash(&mut self, hash: B256) -> Result<L2BlockInfo, Self::Error> {
        self.blocks.get(&hash).copied().ok_or_else(|| anyhow!("Block not found"))
    }

    async fn system_config_by_l2_hash(
        &mut self,
        hash: B256,
    ) -> Result<SystemConfig, Self::Error> {
        self.system_configs.get(&hash).copied().ok_or_else(|| anyhow!("System config not found"))
    }
}

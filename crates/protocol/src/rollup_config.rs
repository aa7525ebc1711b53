//! This module contains the [RollupConfig] type and the hardfork schedule.

use crate::SystemConfig;
use alloy_eips::BlockNumHash;
use alloy_primitives::Address;

/// The default L2 block time, in seconds.
const DEFAULT_BLOCK_TIME: u64 = 2;

/// The default channel timeout, in L1 blocks.
const DEFAULT_CHANNEL_TIMEOUT: u64 = 300;

/// A network upgrade of the rollup protocol, in activation order.
#[derive(derive_more::Display, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Hardfork {
    /// Regolith network upgrade.
    #[display("regolith")]
    Regolith,
    /// Canyon network upgrade.
    #[display("canyon")]
    Canyon,
    /// Delta network upgrade.
    #[display("delta")]
    Delta,
    /// Ecotone network upgrade.
    #[display("ecotone")]
    Ecotone,
    /// Fjord network upgrade.
    #[display("fjord")]
    Fjord,
    /// Granite network upgrade.
    #[display("granite")]
    Granite,
    /// Holocene network upgrade.
    #[display("holocene")]
    Holocene,
    /// Isthmus network upgrade.
    #[display("isthmus")]
    Isthmus,
    /// Interop feature-set, activated like a hardfork.
    #[display("interop")]
    Interop,
}

impl Hardfork {
    /// Every hardfork, in activation order.
    pub const ALL: [Self; 9] = [
        Self::Regolith,
        Self::Canyon,
        Self::Delta,
        Self::Ecotone,
        Self::Fjord,
        Self::Granite,
        Self::Holocene,
        Self::Isthmus,
        Self::Interop,
    ];
}

/// Represents the genesis state of the rollup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainGenesis {
    /// The L1 block that the rollup starts *after* (no derived transactions)
    pub l1: BlockNumHash,
    /// The L2 block the rollup starts from (no transactions, pre-configured state)
    pub l2: BlockNumHash,
    /// Timestamp of the L2 block.
    pub l2_time: u64,
    /// Initial system configuration values.
    pub system_config: Option<SystemConfig>,
}

/// The Rollup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RollupConfig {
    /// The genesis state of the rollup.
    pub genesis: ChainGenesis,
    /// The block time of the L2, in seconds.
    pub block_time: u64,
    /// Number of L1 blocks between when a channel can be opened and when it can be closed.
    pub channel_timeout: u64,
    /// The L1 chain ID
    pub l1_chain_id: u64,
    /// The L2 chain ID
    pub l2_chain_id: u64,
    /// Activation time of the Regolith network upgrade.
    pub regolith_time: Option<u64>,
    /// Activation time of the Canyon network upgrade.
    pub canyon_time: Option<u64>,
    /// Activation time of the Delta network upgrade.
    pub delta_time: Option<u64>,
    /// Activation time of the Ecotone network upgrade.
    pub ecotone_time: Option<u64>,
    /// Activation time of the Fjord network upgrade.
    pub fjord_time: Option<u64>,
    /// Activation time of the Granite network upgrade.
    pub granite_time: Option<u64>,
    /// Activation time of the Holocene network upgrade.
    pub holocene_time: Option<u64>,
    /// Activation time of the Isthmus network upgrade.
    pub isthmus_time: Option<u64>,
    /// Activation time of the interop feature-set.
    ///
    /// Once active, finality and cross-safety are decided by the superchain backend rather than
    /// by this node alone.
    pub interop_time: Option<u64>,
    /// The L1 address that batches are sent to.
    pub batch_inbox_address: Address,
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self {
            genesis: ChainGenesis::default(),
            block_time: DEFAULT_BLOCK_TIME,
            channel_timeout: DEFAULT_CHANNEL_TIMEOUT,
            l1_chain_id: 0,
            l2_chain_id: 0,
            regolith_time: None,
            canyon_time: None,
            delta_time: None,
            ecotone_time: None,
            fjord_time: None,
            granite_time: None,
            holocene_time: None,
            isthmus_time: None,
            interop_time: None,
            batch_inbox_address: Address::ZERO,
        }
    }
}

impl RollupConfig {
    /// Returns the activation time of the given [Hardfork], if it is scheduled.
    pub const fn activation_time(&self, fork: Hardfork) -> Option<u64> {
        match fork {
            Hardfork::Regolith => self.regolith_time,
            Hardfork::Canyon => self.canyon_time,
            Hardfork::Delta => self.delta_time,
            Hardfork::Ecotone => self.ecotone_time,
            Hardfork::Fjord => self.fjord_time,
            Hardfork::Granite => self.granite_time,
            Hardfork::Holocene => self.holocene_time,
            Hardfork::Isthmus => self.isthmus_time,
            Hardfork::Interop => self.interop_time,
        }
    }

    /// Returns true if the given [Hardfork] is active at the given timestamp.
    pub fn is_active(&self, fork: Hardfork, timestamp: u64) -> bool {
        self.activation_time(fork).is_some_and(|t| timestamp >= t)
    }

    /// Returns true if Regolith is active at the given timestamp.
    pub fn is_regolith_active(&self, timestamp: u64) -> bool {
        self.is_active(Hardfork::Regolith, timestamp)
    }

    /// Returns true if Ecotone is active at the given timestamp.
    pub fn is_ecotone_active(&self, timestamp: u64) -> bool {
        self.is_active(Hardfork::Ecotone, timestamp)
    }

    /// Returns true if Holocene is active at the given timestamp.
    pub fn is_holocene_active(&self, timestamp: u64) -> bool {
        self.is_active(Hardfork::Holocene, timestamp)
    }

    /// Returns true if the interop feature-set is active at the given timestamp.
    pub fn is_interop_active(&self, timestamp: u64) -> bool {
        self.is_active(Hardfork::Interop, timestamp)
    }

    /// Returns the latest [Hardfork] that activates strictly after `old_time` and at or before
    /// `new_time`, if any.
    ///
    /// Used to detect that an L1 origin change crossed a fork boundary.
    pub fn is_activation_block(&self, old_time: u64, new_time: u64) -> Option<Hardfork> {
        Hardfork::ALL
            .into_iter()
            .rev()
            .find(|fork| self.is_active(*fork, new_time) && !self.is_active(*fork, old_time))
    }
}

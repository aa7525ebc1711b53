#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod block;
pub use block::{BlockInfo, L2BlockInfo};

mod system_config;
pub use system_config::SystemConfig;

mod rollup_config;
pub use rollup_config::{ChainGenesis, Hardfork, RollupConfig};

mod attributes;
pub use attributes::{is_deposit_transaction, AttributesWithParent, PayloadAttributes};

mod payload;
pub use payload::{ExecutionPayload, ExecutionPayloadEnvelope};

mod safety;
pub use safety::{SafetyLevel, SafetyLevelParseError};

/// Re-exported block identifier, a `(number, hash)` pair.
pub use alloy_eips::BlockNumHash;

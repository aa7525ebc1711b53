#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(any(test, feature = "test-utils")), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

mod core;
pub use core::Driver;

pub mod config;
pub use config::{DriverConfig, SyncConfig};

mod deriver;
pub use deriver::{Deriver, DeriverMux};

mod engine;
pub use engine::{EngDeriver, EngineClient, EngineClientError, EngineController};

mod errors;
pub use errors::{DriverError, DriverResult, EngineError};

mod events;
pub use events::{BuiltPayload, Emitter, Event, ResetHeads};

mod finality;
pub use finality::{FinalityData, Finalizer, FinalizerHandle, FinalizerState};

mod pipeline;
pub use pipeline::PipelineDeriver;

mod queue;
pub use queue::EventQueue;

mod reset;
pub use reset::{EngineResetDeriver, FindL2Heads, L2Heads};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

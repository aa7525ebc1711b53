//! Test Utilities for `rollup-derive`.

mod pipeline;
pub use pipeline::{new_test_pipeline, TestNextAttributes, TestPipeline};

mod attributes;
pub use attributes::{TestAttributesBuilder, TestAttributesProvider};

mod chain_providers;
pub use chain_providers::{TestChainProvider, TestL2ChainProvider};

mod stages;
pub use stages::TestStage;

mod tracing;
pub use tracing::{CollectingLayer, TraceStorage};

//! This module contains each stage of the derivation pipeline hosted by this crate.
//!
//! Batch decoding happens in earlier stages that implement [AttributesProvider] and feed the
//! [AttributesQueue], the top-level stage of the pipeline.
//!
//! [AttributesProvider]: crate::traits::AttributesProvider

mod attributes_queue;
pub use attributes_queue::{AttributesQueue, ATTRIBUTES_TIMEOUT};

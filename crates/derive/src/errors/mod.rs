//! Error types for the derivation pipeline.

mod attributes;
pub use attributes::BuilderError;

mod pipeline;
pub use pipeline::{PipelineError, PipelineErrorKind, PipelineResult, ResetError};

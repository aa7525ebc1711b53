//! Test utilities for `rollup-driver`.

mod emitter;
pub use emitter::TestEmitter;

mod engine;
pub use engine::TestEngineClient;

mod reset;
pub use reset::TestFindL2Heads;

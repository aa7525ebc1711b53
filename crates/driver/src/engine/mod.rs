//! The execution engine: its client, the controller holding its heads, and the [EngDeriver].

mod client;
pub use client::{EngineClient, EngineClientError};

mod controller;
pub use controller::EngineController;

mod deriver;
pub use deriver::EngDeriver;

//! Configuration models

pub mod client;
pub mod engine;
pub mod logging;

pub use client::ClientConfig;
pub use engine::EngineConfig;
pub use logging::LoggingConfig;

//! Utilities shared by the engine, the REST client and the binary

pub mod error;
pub mod logging;

//! Integration tests for marketplace-rbac
//!
//! These tests drive the public API end to end: the engine through its
//! registries and checker, and the client state containers through a mock
//! REST server.

pub mod client_state_tests;
pub mod config_tests;
pub mod engine_property_tests;
pub mod scenario_tests;

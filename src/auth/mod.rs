//! Authorization
//!
//! The in-process RBAC engine lives in [`rbac`].

pub mod rbac;

pub use rbac::{AccessControl, RbacSystem};

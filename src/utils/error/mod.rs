//! Error handling
//!
//! One taxonomy is shared by the in-process engine and the REST client so
//! callers can handle both the same way.

mod conversions;
mod helpers;
mod types;

#[cfg(test)]
mod tests;

pub use types::{RbacError, Result};

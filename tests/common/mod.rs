//! Common test utilities for marketplace-rbac
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::common::fixtures::TestMarketplace;
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let market = TestMarketplace::new();
//!     let read = market.permission("products.read").await;
//!     // ...
//! }
//! ```

pub mod assertions;
pub mod fixtures;

// Re-export commonly used items
pub use assertions::AccessResultAssertions;
pub use fixtures::{ADMIN, TestMarketplace, principal};

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}

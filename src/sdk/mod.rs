//! REST client SDK
//!
//! A typed client for the RBAC REST contract, the credential context every
//! call takes, the list/entity response normalization and the client-side
//! state containers built on top of it.

pub mod client;
pub mod credentials;
pub mod envelope;
pub mod state;

// Re-exports for convenience
pub use client::{AuthenticatedClient, RbacApiClient};
pub use credentials::{Credentials, RequestOptions};
pub use state::{AssignmentsState, EntityCache, ListState, PermissionsState, RolesState};

/// SDK version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

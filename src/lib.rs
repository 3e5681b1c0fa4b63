//! # marketplace-rbac
//!
//! Role-based access control for the marketplace back office.
//!
//! ## Features
//!
//! - **Permission registry**: codes, scopes, dependencies and conflicts
//! - **Role hierarchy**: single-parent inheritance kept acyclic and conflict-free
//! - **Assignments**: time-bounded grants with an explicit lifecycle
//! - **Access checks**: single and bulk, evaluated against one consistent snapshot
//! - **Audit**: every mutation and recorded check, plus security reports
//! - **REST client**: the same contract over HTTP/JSON, with client-side state containers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use marketplace_rbac::config::EngineConfig;
//! use marketplace_rbac::core::models::{CreatePermission, CreateRole, Principal};
//! use marketplace_rbac::{AccessControl, RbacSystem};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> marketplace_rbac::Result<()> {
//!     let rbac = RbacSystem::new(EngineConfig::default());
//!
//!     let read = rbac
//!         .create_permission(CreatePermission::new("products.read", "Read products"), "admin")
//!         .await?;
//!     rbac.create_role(
//!         CreateRole::new("vendeur", "Vendeur")
//!             .permissions([read.uuid])
//!             .default_for(["vendeur"]),
//!         "admin",
//!     )
//!     .await?;
//!
//!     let principal = Principal::new(Uuid::new_v4(), "vendeur");
//!     rbac.assign_default_roles(&principal, "system").await?;
//!
//!     let result = rbac.check(&principal, "products.read", None).await?;
//!     println!("granted: {} (via {:?})", result.granted, result.granted_by_roles);
//!     Ok(())
//! }
//! ```

#![warn(missing_debug_implementations)]
#![allow(missing_docs)]

pub mod auth;
pub mod config;
pub mod core;
pub mod sdk;
pub mod utils;

// Re-export main types
pub use auth::rbac::{AccessControl, Clock, ExpirySweeper, RbacStats, RbacSystem, SweeperHandle};
pub use config::Config;
pub use sdk::{AuthenticatedClient, Credentials, RbacApiClient, RequestOptions};
pub use utils::error::{RbacError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

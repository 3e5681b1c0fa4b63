//! Client-side state containers
//!
//! Each container keeps a list view (filters, page, status) and an
//! [`EntityCache`] over one entity kind. Every mutation goes through the
//! REST client and the cache adopts the entity the server returned.

pub mod assignments;
pub mod cache;
pub mod list;
pub mod permissions;
pub mod roles;

pub use assignments::AssignmentsState;
pub use cache::EntityCache;
pub use list::ListState;
pub use permissions::PermissionsState;
pub use roles::RolesState;

//! Role-Based Access Control (RBAC) engine
//!
//! Permission and role registries, the role assignment lifecycle, access
//! checks, and the audit trail, all behind one [`RbacSystem`] handle.

mod access;
mod assignments;
mod audit;
mod clock;
mod helpers;
mod permissions;
mod roles;
mod state;
mod sweeper;
mod system;
mod validation;

pub use access::AccessControl;
pub use clock::{Clock, ManualClock, SystemClock};
pub use sweeper::{ExpirySweeper, SweeperHandle};
pub use system::{RbacStats, RbacSystem};

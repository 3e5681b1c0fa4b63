//! Domain models
//!
//! Rust identifiers are English; serde names follow the REST contract.

pub mod access;
pub mod assignment;
pub mod audit;
pub mod common;
pub mod permission;
pub mod report;
pub mod role;

pub use access::{AccessCheckRequest, AccessCheckResult, AccessContext, BulkAccessCheckRequest};
pub use assignment::{
    AssignmentStatus, CreateAssignment, RoleAssignment, TransitionRequest, ValidityWindow,
};
pub use audit::{AuditAction, AuditEntry, AuditFilter, AuditTarget};
pub use common::{DailyWindow, Identified, Page, PageRequest, Principal, SortOrder};
pub use permission::{
    CreatePermission, Permission, PermissionFilter, PermissionKind, PermissionScope,
    Restriction, UpdatePermission,
};
pub use report::{CountedItem, ReportPeriod, SecurityReport};
pub use role::{
    CreateRole, ReplacePermissions, Role, RoleFilter, RoleHierarchy, RoleLimitations, UpdateRole,
};

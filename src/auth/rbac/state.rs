//! Engine state guarded by a single lock

use crate::core::models::{
    AuditAction, AuditEntry, AuditTarget, Permission, Principal, Role, RoleAssignment,
};
use crate::utils::error::{RbacError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// All entities live behind one lock so every mutation validates and
/// applies under a single write guard and every read sees one snapshot.
#[derive(Debug, Default)]
pub(crate) struct RbacState {
    pub(super) permissions: HashMap<Uuid, Permission>,
    pub(super) permission_codes: HashMap<String, Uuid>,
    pub(super) roles: HashMap<Uuid, Role>,
    /// Codes of soft-deleted roles stay reserved
    pub(super) role_codes: HashMap<String, Uuid>,
    pub(super) assignments: HashMap<Uuid, RoleAssignment>,
    pub(super) audit_log: Vec<AuditEntry>,
}

/// Fields of an audit entry besides its id and timestamp
pub(super) struct AuditRecord {
    pub action: AuditAction,
    pub target_type: AuditTarget,
    pub target_uuid: Option<Uuid>,
    pub actor: Option<String>,
    pub principal: Option<Principal>,
    pub details: serde_json::Value,
}

impl RbacState {
    pub(super) fn permission(&self, uuid: Uuid) -> Result<&Permission> {
        self.permissions
            .get(&uuid)
            .ok_or_else(|| RbacError::not_found("permission", uuid))
    }

    pub(super) fn permission_by_code(&self, code: &str) -> Option<&Permission> {
        self.permission_codes
            .get(code)
            .and_then(|uuid| self.permissions.get(uuid))
    }

    /// Role that exists and is not soft-deleted
    pub(super) fn live_role(&self, uuid: Uuid) -> Result<&Role> {
        self.roles
            .get(&uuid)
            .filter(|r| !r.is_deleted())
            .ok_or_else(|| RbacError::not_found("role", uuid))
    }

    pub(super) fn live_roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values().filter(|r| !r.is_deleted())
    }

    pub(super) fn assignment(&self, uuid: Uuid) -> Result<&RoleAssignment> {
        self.assignments
            .get(&uuid)
            .ok_or_else(|| RbacError::not_found("role_assignment", uuid))
    }

    /// Permission code for messages, falling back to the uuid
    pub(super) fn permission_label(&self, uuid: Uuid) -> String {
        self.permissions
            .get(&uuid)
            .map(|p| p.code.clone())
            .unwrap_or_else(|| uuid.to_string())
    }

    pub(super) fn role_label(&self, uuid: Uuid) -> String {
        self.roles
            .get(&uuid)
            .map(|r| r.code.clone())
            .unwrap_or_else(|| uuid.to_string())
    }

    pub(super) fn append_audit(&mut self, record: AuditRecord, at: DateTime<Utc>) -> AuditEntry {
        let entry = AuditEntry {
            uuid: Uuid::new_v4(),
            action: record.action,
            target_type: record.target_type,
            target_uuid: record.target_uuid,
            actor: record.actor,
            principal: record.principal,
            details: record.details,
            recorded_at: at,
        };
        self.audit_log.push(entry.clone());
        entry
    }
}

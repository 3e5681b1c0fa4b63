//! Audit log model

use super::common::Principal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    PermissionCreated,
    PermissionUpdated,
    PermissionDeleted,
    RoleCreated,
    RoleUpdated,
    RoleDeleted,
    RolePermissionAdded,
    RolePermissionRemoved,
    RolePermissionsReplaced,
    RoleParentChanged,
    AssignmentCreated,
    AssignmentRevoked,
    AssignmentSuspended,
    AssignmentReactivated,
    AssignmentExpired,
    AccessChecked,
}

/// Kind of entity the action targeted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditTarget {
    Permission,
    Role,
    RoleAssignment,
    AccessCheck,
}

/// Append-only, immutable once written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub uuid: Uuid,
    pub action: AuditAction,
    #[serde(rename = "cible_type")]
    pub target_type: AuditTarget,
    #[serde(rename = "cible_uuid", default, skip_serializing_if = "Option::is_none")]
    pub target_uuid: Option<Uuid>,
    #[serde(rename = "acteur", default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    #[serde(default)]
    pub details: serde_json::Value,
    #[serde(rename = "horodatage")]
    pub recorded_at: DateTime<Utc>,
}

/// Audit log query filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<AuditAction>,
    #[serde(rename = "cible_type", default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<AuditTarget>,
    #[serde(rename = "acteur", default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(rename = "date_debut", default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(rename = "date_fin", default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
}

impl AuditFilter {
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        self.action.is_none_or(|a| a == entry.action)
            && self.target_type.is_none_or(|t| t == entry.target_type)
            && self
                .actor
                .as_ref()
                .is_none_or(|a| entry.actor.as_ref() == Some(a))
            && self.from.is_none_or(|from| entry.recorded_at >= from)
            && self.to.is_none_or(|to| entry.recorded_at < to)
    }
}

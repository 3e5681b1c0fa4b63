//! Role domain model

use super::common::{DailyWindow, Identified, SortOrder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

fn default_true() -> bool {
    true
}

/// Caps enforced when a role is assigned, never when it is defined
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleLimitations {
    /// Maximum number of distinct principals holding the role at once
    #[serde(rename = "utilisateurs_max", default, skip_serializing_if = "Option::is_none")]
    pub max_principals: Option<u32>,
    /// Maximum validity window of a single assignment
    #[serde(rename = "duree_validite_jours", default, skip_serializing_if = "Option::is_none")]
    pub validity_days: Option<u32>,
    #[serde(rename = "horaires_acces", default, skip_serializing_if = "Option::is_none")]
    pub access_hours: Option<DailyWindow>,
}

/// Named bundle of permissions, optionally inheriting from one parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub uuid: Uuid,
    pub code: String,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "niveau")]
    pub level: u8,
    /// Parent pointer; the hierarchy is a tree
    #[serde(rename = "parent_uuid", default, skip_serializing_if = "Option::is_none")]
    pub parent_uuid: Option<Uuid>,
    /// Own permissions, inherited ones excluded
    #[serde(default)]
    pub permissions: BTreeSet<Uuid>,
    #[serde(rename = "est_par_defaut", default)]
    pub is_default: bool,
    #[serde(rename = "est_modifiable", default = "default_true")]
    pub is_editable: bool,
    #[serde(rename = "est_visible", default = "default_true")]
    pub is_visible: bool,
    /// Principal types eligible for default auto-assignment; empty means all
    #[serde(rename = "types_utilisateur", default)]
    pub principal_types: Vec<String>,
    #[serde(default)]
    pub limitations: RoleLimitations,
    /// Incremented on every mutation, used for optimistic concurrency
    #[serde(default)]
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn accepts_principal_type(&self, user_type: &str) -> bool {
        self.principal_types.is_empty() || self.principal_types.iter().any(|t| t == user_type)
    }
}

impl Identified for Role {
    fn uuid(&self) -> Uuid {
        self.uuid
    }
}

/// Role creation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRole {
    pub code: String,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "niveau")]
    pub level: u8,
    #[serde(rename = "parent_uuid", default, skip_serializing_if = "Option::is_none")]
    pub parent_uuid: Option<Uuid>,
    /// Duplicates are ignored
    #[serde(default)]
    pub permissions: Vec<Uuid>,
    #[serde(rename = "est_par_defaut", default)]
    pub is_default: bool,
    #[serde(rename = "est_modifiable", default = "default_true")]
    pub is_editable: bool,
    #[serde(rename = "est_visible", default = "default_true")]
    pub is_visible: bool,
    #[serde(rename = "types_utilisateur", default)]
    pub principal_types: Vec<String>,
    #[serde(default)]
    pub limitations: RoleLimitations,
}

impl CreateRole {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: String::new(),
            level: 1,
            parent_uuid: None,
            permissions: Vec::new(),
            is_default: false,
            is_editable: true,
            is_visible: true,
            principal_types: Vec::new(),
            limitations: RoleLimitations::default(),
        }
    }

    pub fn level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn parent(mut self, parent: Uuid) -> Self {
        self.parent_uuid = Some(parent);
        self
    }

    pub fn permissions(mut self, permissions: impl IntoIterator<Item = Uuid>) -> Self {
        self.permissions.extend(permissions);
        self
    }

    pub fn default_for(mut self, principal_types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.is_default = true;
        self.principal_types = principal_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn frozen(mut self) -> Self {
        self.is_editable = false;
        self
    }

    pub fn limitations(mut self, limitations: RoleLimitations) -> Self {
        self.limitations = limitations;
        self
    }
}

/// Role update payload; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateRole {
    #[serde(rename = "nom", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "niveau", skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(rename = "est_par_defaut", skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(rename = "est_modifiable", skip_serializing_if = "Option::is_none")]
    pub is_editable: Option<bool>,
    #[serde(rename = "est_visible", skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    #[serde(rename = "types_utilisateur", skip_serializing_if = "Option::is_none")]
    pub principal_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limitations: Option<RoleLimitations>,
}

impl UpdateRole {
    /// A frozen role accepts only the patch that unfreezes it
    pub fn only_toggles_editable(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.level.is_none()
            && self.is_default.is_none()
            && self.is_visible.is_none()
            && self.principal_types.is_none()
            && self.limitations.is_none()
            && self.is_editable.is_some()
    }

    pub(crate) fn apply_to(self, target: &mut Role) {
        if let Some(v) = self.name {
            target.name = v;
        }
        if let Some(v) = self.description {
            target.description = v;
        }
        if let Some(v) = self.level {
            target.level = v;
        }
        if let Some(v) = self.is_default {
            target.is_default = v;
        }
        if let Some(v) = self.is_editable {
            target.is_editable = v;
        }
        if let Some(v) = self.is_visible {
            target.is_visible = v;
        }
        if let Some(v) = self.principal_types {
            target.principal_types = v;
        }
        if let Some(v) = self.limitations {
            target.limitations = v;
        }
    }
}

/// Read-only tree view derived from parent pointers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleHierarchy {
    pub role: Role,
    #[serde(rename = "enfants", default)]
    pub children: Vec<RoleHierarchy>,
}

impl RoleHierarchy {
    /// Number of roles in the tree, root included
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(RoleHierarchy::size).sum::<usize>()
    }
}

/// Body of a bulk permission replacement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacePermissions {
    pub permissions: Vec<Uuid>,
    /// Expected role version; a mismatch is rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

/// Recognized role list filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(rename = "niveau", default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(rename = "est_visible", default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    #[serde(rename = "est_par_defaut", default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl RoleFilter {
    pub fn matches(&self, role: &Role) -> bool {
        self.level.is_none_or(|v| v == role.level)
            && self.is_visible.is_none_or(|v| v == role.is_visible)
            && self.is_default.is_none_or(|v| v == role.is_default)
            && self.search.as_ref().is_none_or(|s| {
                let needle = s.to_lowercase();
                role.code.to_lowercase().contains(&needle)
                    || role.name.to_lowercase().contains(&needle)
                    || role.description.to_lowercase().contains(&needle)
            })
    }

    pub fn sort(&self, items: &mut [Role]) {
        match self.sort_by.as_deref() {
            Some("nom") => items.sort_by(|a, b| a.name.cmp(&b.name)),
            Some("niveau") => items.sort_by(|a, b| a.level.cmp(&b.level).then(a.code.cmp(&b.code))),
            Some("created_at") => items.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            _ => items.sort_by(|a, b| a.code.cmp(&b.code)),
        }
        if self.sort_order == Some(SortOrder::Desc) {
            items.reverse();
        }
    }
}

//! Permission domain model

use super::access::AccessContext;
use super::common::{DailyWindow, Identified, Principal, SortOrder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Breadth at which a permission applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PermissionScope {
    #[default]
    #[serde(rename = "global")]
    Global,
    #[serde(rename = "groupe")]
    Group,
    #[serde(rename = "objet")]
    Object,
    #[serde(rename = "utilisateur")]
    User,
}

impl fmt::Display for PermissionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PermissionScope::Global => "global",
            PermissionScope::Group => "groupe",
            PermissionScope::Object => "objet",
            PermissionScope::User => "utilisateur",
        };
        f.write_str(s)
    }
}

/// Kind of action a permission grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PermissionKind {
    #[default]
    #[serde(rename = "lecture")]
    Read,
    #[serde(rename = "ecriture")]
    Write,
    #[serde(rename = "modification")]
    Update,
    #[serde(rename = "suppression")]
    Delete,
    #[serde(rename = "approbation")]
    Approve,
    #[serde(rename = "administration")]
    Administer,
}

/// Condition evaluated against the check context; a failing restriction blocks access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Restriction {
    #[serde(rename = "plage_horaire")]
    TimeWindow(DailyWindow),
    #[serde(rename = "adresses_ip")]
    IpAddresses {
        #[serde(rename = "adresses")]
        addresses: Vec<String>,
    },
    #[serde(rename = "types_utilisateur")]
    PrincipalTypes {
        #[serde(rename = "types")]
        types: Vec<String>,
    },
    #[serde(rename = "attribut")]
    Attribute {
        #[serde(rename = "cle")]
        key: String,
        #[serde(rename = "valeurs")]
        values: Vec<String>,
    },
}

impl Restriction {
    /// Label reported in `restrictions_appliquees`
    pub fn name(&self) -> String {
        match self {
            Restriction::TimeWindow(window) => format!("plage_horaire:{}", window),
            Restriction::IpAddresses { .. } => "adresses_ip".to_string(),
            Restriction::PrincipalTypes { .. } => "types_utilisateur".to_string(),
            Restriction::Attribute { key, .. } => format!("attribut:{}", key),
        }
    }

    /// Whether this restriction lets the request through
    pub fn admits(
        &self,
        principal: &Principal,
        context: Option<&AccessContext>,
        at: DateTime<Utc>,
    ) -> bool {
        match self {
            Restriction::TimeWindow(window) => window.contains(at.time()),
            Restriction::IpAddresses { addresses } => context
                .and_then(|c| c.ip.as_deref())
                .is_some_and(|ip| addresses.iter().any(|a| a == ip)),
            Restriction::PrincipalTypes { types } => types.iter().any(|t| *t == principal.user_type),
            Restriction::Attribute { key, values } => context
                .and_then(|c| c.attributes.get(key))
                .is_some_and(|v| values.contains(v)),
        }
    }
}

/// Atomic, named capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub uuid: Uuid,
    /// Unique key such as `products.delete`; never changes after creation
    pub code: String,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "categorie")]
    pub category: String,
    #[serde(rename = "sous_categorie", default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub module: String,
    pub service: String,
    #[serde(rename = "portee", default)]
    pub scope: PermissionScope,
    #[serde(rename = "type", default)]
    pub kind: PermissionKind,
    /// 1..=5, higher is more privileged
    #[serde(rename = "niveau")]
    pub level: u8,
    #[serde(rename = "est_systeme", default)]
    pub is_system: bool,
    #[serde(rename = "est_obligatoire", default)]
    pub is_mandatory: bool,
    #[serde(rename = "est_cachee", default)]
    pub is_hidden: bool,
    #[serde(rename = "dependances", default)]
    pub dependencies: BTreeSet<Uuid>,
    #[serde(default)]
    pub conflicts: BTreeSet<Uuid>,
    #[serde(rename = "groupes", default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub restrictions: Vec<Restriction>,
    #[serde(rename = "utilisation_count", default)]
    pub usage_count: u64,
    #[serde(rename = "derniere_utilisation", default)]
    pub last_used_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Identified for Permission {
    fn uuid(&self) -> Uuid {
        self.uuid
    }
}

/// Permission creation payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePermission {
    pub code: String,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "categorie")]
    pub category: String,
    #[serde(rename = "sous_categorie", default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub module: String,
    pub service: String,
    #[serde(rename = "portee", default)]
    pub scope: PermissionScope,
    #[serde(rename = "type", default)]
    pub kind: PermissionKind,
    #[serde(rename = "niveau")]
    pub level: u8,
    #[serde(rename = "est_systeme", default)]
    pub is_system: bool,
    #[serde(rename = "est_obligatoire", default)]
    pub is_mandatory: bool,
    #[serde(rename = "est_cachee", default)]
    pub is_hidden: bool,
    #[serde(rename = "dependances", default)]
    pub dependencies: BTreeSet<Uuid>,
    #[serde(default)]
    pub conflicts: BTreeSet<Uuid>,
    #[serde(rename = "groupes", default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub restrictions: Vec<Restriction>,
}

impl CreatePermission {
    /// Payload with classification derived from the code prefix (`products.delete` → `products`)
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        let code = code.into();
        let module = code.split('.').next().unwrap_or_default().to_string();
        Self {
            category: module.clone(),
            service: module.clone(),
            module,
            code,
            name: name.into(),
            level: 1,
            ..Default::default()
        }
    }

    pub fn kind(mut self, kind: PermissionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn scope(mut self, scope: PermissionScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.is_mandatory = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_hidden = true;
        self
    }

    pub fn depends_on(mut self, permission: Uuid) -> Self {
        self.dependencies.insert(permission);
        self
    }

    pub fn conflicts_with(mut self, permission: Uuid) -> Self {
        self.conflicts.insert(permission);
        self
    }

    pub fn restricted_by(mut self, restriction: Restriction) -> Self {
        self.restrictions.push(restriction);
        self
    }
}

/// Permission update payload; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePermission {
    #[serde(rename = "nom", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "categorie", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "sous_categorie", skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(rename = "portee", skip_serializing_if = "Option::is_none")]
    pub scope: Option<PermissionScope>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<PermissionKind>,
    #[serde(rename = "niveau", skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(rename = "est_obligatoire", skip_serializing_if = "Option::is_none")]
    pub is_mandatory: Option<bool>,
    #[serde(rename = "est_cachee", skip_serializing_if = "Option::is_none")]
    pub is_hidden: Option<bool>,
    #[serde(rename = "dependances", skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeSet<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<BTreeSet<Uuid>>,
    #[serde(rename = "groupes", skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<Vec<Restriction>>,
    #[serde(rename = "utilisation_count", skip_serializing_if = "Option::is_none")]
    pub usage_count: Option<u64>,
    #[serde(rename = "derniere_utilisation", skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl UpdatePermission {
    /// True when the patch only carries usage counters, the one write system permissions accept
    pub fn touches_only_usage(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.subcategory.is_none()
            && self.module.is_none()
            && self.service.is_none()
            && self.scope.is_none()
            && self.kind.is_none()
            && self.level.is_none()
            && self.is_mandatory.is_none()
            && self.is_hidden.is_none()
            && self.dependencies.is_none()
            && self.conflicts.is_none()
            && self.groups.is_none()
            && self.tags.is_none()
            && self.restrictions.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.touches_only_usage() && self.usage_count.is_none() && self.last_used_at.is_none()
    }

    /// Apply to `target`; callers validate beforehand
    pub(crate) fn apply_to(self, target: &mut Permission) {
        if let Some(v) = self.name {
            target.name = v;
        }
        if let Some(v) = self.description {
            target.description = v;
        }
        if let Some(v) = self.category {
            target.category = v;
        }
        if let Some(v) = self.subcategory {
            target.subcategory = Some(v);
        }
        if let Some(v) = self.module {
            target.module = v;
        }
        if let Some(v) = self.service {
            target.service = v;
        }
        if let Some(v) = self.scope {
            target.scope = v;
        }
        if let Some(v) = self.kind {
            target.kind = v;
        }
        if let Some(v) = self.level {
            target.level = v;
        }
        if let Some(v) = self.is_mandatory {
            target.is_mandatory = v;
        }
        if let Some(v) = self.is_hidden {
            target.is_hidden = v;
        }
        if let Some(v) = self.dependencies {
            target.dependencies = v;
        }
        if let Some(v) = self.conflicts {
            target.conflicts = v;
        }
        if let Some(v) = self.groups {
            target.groups = v;
        }
        if let Some(v) = self.tags {
            target.tags = v;
        }
        if let Some(v) = self.restrictions {
            target.restrictions = v;
        }
        if let Some(v) = self.usage_count {
            target.usage_count = v;
        }
        if let Some(v) = self.last_used_at {
            target.last_used_at = Some(v);
        }
    }
}

/// Recognized permission list filters; unknown keys are ignored on deserialization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionFilter {
    #[serde(rename = "categorie", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PermissionKind>,
    #[serde(rename = "niveau", default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(rename = "portee", default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<PermissionScope>,
    #[serde(rename = "est_systeme", default, skip_serializing_if = "Option::is_none")]
    pub is_system: Option<bool>,
    #[serde(rename = "est_obligatoire", default, skip_serializing_if = "Option::is_none")]
    pub is_mandatory: Option<bool>,
    #[serde(rename = "est_cachee", default, skip_serializing_if = "Option::is_none")]
    pub is_hidden: Option<bool>,
    #[serde(rename = "groupes", default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(rename = "tags", default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl PermissionFilter {
    pub fn matches(&self, permission: &Permission) -> bool {
        // Hidden permissions are still enforced but only listed on explicit request.
        let hidden_ok = match self.is_hidden {
            Some(flag) => permission.is_hidden == flag,
            None => !permission.is_hidden,
        };
        hidden_ok
            && self.category.as_ref().is_none_or(|v| *v == permission.category)
            && self.module.as_ref().is_none_or(|v| *v == permission.module)
            && self.service.as_ref().is_none_or(|v| *v == permission.service)
            && self.kind.is_none_or(|v| v == permission.kind)
            && self.level.is_none_or(|v| v == permission.level)
            && self.scope.is_none_or(|v| v == permission.scope)
            && self.is_system.is_none_or(|v| v == permission.is_system)
            && self.is_mandatory.is_none_or(|v| v == permission.is_mandatory)
            && self.group.as_ref().is_none_or(|g| permission.groups.contains(g))
            && self.tag.as_ref().is_none_or(|t| permission.tags.contains(t))
            && self.search.as_ref().is_none_or(|s| {
                let needle = s.to_lowercase();
                permission.code.to_lowercase().contains(&needle)
                    || permission.name.to_lowercase().contains(&needle)
                    || permission.description.to_lowercase().contains(&needle)
            })
    }

    /// Sort according to `sort_by`/`sort_order`; unknown sort keys fall back to `code`
    pub fn sort(&self, items: &mut [Permission]) {
        match self.sort_by.as_deref() {
            Some("nom") => items.sort_by(|a, b| a.name.cmp(&b.name)),
            Some("niveau") => items.sort_by(|a, b| a.level.cmp(&b.level).then(a.code.cmp(&b.code))),
            Some("categorie") => {
                items.sort_by(|a, b| a.category.cmp(&b.category).then(a.code.cmp(&b.code)))
            }
            Some("module") => items.sort_by(|a, b| a.module.cmp(&b.module).then(a.code.cmp(&b.code))),
            Some("created_at") => items.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            Some("utilisation_count") | Some("usage_count") => {
                items.sort_by(|a, b| a.usage_count.cmp(&b.usage_count).then(a.code.cmp(&b.code)))
            }
            _ => items.sort_by(|a, b| a.code.cmp(&b.code)),
        }
        if self.sort_order == Some(SortOrder::Desc) {
            items.reverse();
        }
    }
}

//! Access check request, context and result types

use super::common::Principal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Caller-supplied context a permission's scope and restrictions are evaluated against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessContext {
    #[serde(rename = "objet_uuid", default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(rename = "groupe_uuid", default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(rename = "utilisateur_cible", default, skip_serializing_if = "Option::is_none")]
    pub target_user: Option<String>,
    #[serde(rename = "adresse_ip", default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(rename = "attributs", default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
}

impl AccessContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn target_user(mut self, user: impl Into<String>) -> Self {
        self.target_user = Some(user.into());
        self
    }

    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Outcome of evaluating one `(principal, permission_code, contexte)` triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessCheckResult {
    #[serde(rename = "autorise")]
    pub granted: bool,
    #[serde(rename = "raison", default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(rename = "restrictions_appliquees", default)]
    pub applied_restrictions: Vec<String>,
    #[serde(default)]
    pub alternatives: Vec<String>,
    /// Codes of the roles that grant the permission
    #[serde(rename = "roles_sources", default)]
    pub granted_by_roles: Vec<String>,
    #[serde(rename = "niveau_acces", default, skip_serializing_if = "Option::is_none")]
    pub access_level: Option<u8>,
    #[serde(rename = "verifie_le", default = "Utc::now")]
    pub checked_at: DateTime<Utc>,
}

impl AccessCheckResult {
    pub fn granted(
        granted_by_roles: Vec<String>,
        applied_restrictions: Vec<String>,
        checked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            granted: true,
            reason: None,
            applied_restrictions,
            alternatives: Vec::new(),
            granted_by_roles,
            access_level: None,
            checked_at,
        }
    }

    pub fn denied(reason: impl Into<String>, checked_at: DateTime<Utc>) -> Self {
        Self {
            granted: false,
            reason: Some(reason.into()),
            applied_restrictions: Vec::new(),
            alternatives: Vec::new(),
            granted_by_roles: Vec::new(),
            access_level: None,
            checked_at,
        }
    }
}

/// Body of `POST /permissions/check-access`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessCheckRequest {
    #[serde(flatten)]
    pub principal: Principal,
    #[serde(rename = "code_permission")]
    pub permission_code: String,
    #[serde(rename = "contexte", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<AccessContext>,
}

/// Body of `POST /permissions/check-multiple`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkAccessCheckRequest {
    #[serde(flatten)]
    pub principal: Principal,
    #[serde(rename = "codes_permissions")]
    pub permission_codes: Vec<String>,
    #[serde(rename = "contexte", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<AccessContext>,
}

//! Access checker

use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::core::models::{
    AccessCheckResult, AccessContext, Permission, PermissionScope, Principal, Role,
};
use crate::utils::error::Result;

use super::helpers::RoleGraph;
use super::state::RbacState;
use super::system::RbacSystem;

/// Answers "may this principal do that?"
///
/// Implemented by the in-process engine and by the REST client, so callers
/// can authorize against either without caring which.
#[async_trait]
pub trait AccessControl: Send + Sync {
    async fn check(
        &self,
        principal: &Principal,
        permission_code: &str,
        context: Option<&AccessContext>,
    ) -> Result<AccessCheckResult>;

    /// One result per requested code, all evaluated against the same snapshot
    async fn check_bulk(
        &self,
        principal: &Principal,
        permission_codes: &[String],
        context: Option<&AccessContext>,
    ) -> Result<HashMap<String, AccessCheckResult>>;

    async fn is_granted(
        &self,
        principal: &Principal,
        permission_code: &str,
        context: Option<&AccessContext>,
    ) -> Result<bool> {
        Ok(self.check(principal, permission_code, context).await?.granted)
    }
}

/// A role the principal currently holds, with its resolved permissions
struct Grant<'a> {
    role: &'a Role,
    effective: BTreeSet<Uuid>,
}

#[async_trait]
impl AccessControl for RbacSystem {
    async fn check(
        &self,
        principal: &Principal,
        permission_code: &str,
        context: Option<&AccessContext>,
    ) -> Result<AccessCheckResult> {
        let at = self.clock.now();
        let state = self.state.read().await;
        let grants = state.grants_for(principal, at)?;
        let result = state.evaluate(principal, permission_code, context, &grants, at);

        debug!(
            principal = %principal,
            permission = permission_code,
            granted = result.granted,
            "Access checked"
        );
        Ok(result)
    }

    async fn check_bulk(
        &self,
        principal: &Principal,
        permission_codes: &[String],
        context: Option<&AccessContext>,
    ) -> Result<HashMap<String, AccessCheckResult>> {
        let at = self.clock.now();
        let state = self.state.read().await;
        let grants = state.grants_for(principal, at)?;

        let results: HashMap<String, AccessCheckResult> = permission_codes
            .iter()
            .map(|code| {
                (
                    code.clone(),
                    state.evaluate(principal, code, context, &grants, at),
                )
            })
            .collect();

        debug!(
            principal = %principal,
            codes = permission_codes.len(),
            granted = results.values().filter(|r| r.granted).count(),
            "Bulk access checked"
        );
        Ok(results)
    }
}

impl RbacSystem {
    /// Every permission the principal currently holds through effective assignments
    pub async fn principal_permissions(&self, principal: &Principal) -> Result<Vec<Permission>> {
        let at = self.clock.now();
        let state = self.state.read().await;
        let union: BTreeSet<Uuid> = state
            .grants_for(principal, at)?
            .into_iter()
            .flat_map(|g| g.effective)
            .collect();
        Ok(state.permissions_sorted(&union))
    }
}

impl RbacState {
    fn grants_for(&self, principal: &Principal, at: DateTime<Utc>) -> Result<Vec<Grant<'_>>> {
        let mut seen = HashSet::new();
        let mut grants = Vec::new();

        for assignment in self
            .assignments
            .values()
            .filter(|a| a.principal == *principal && a.is_effective_at(at))
        {
            if !seen.insert(assignment.role_uuid) {
                continue;
            }
            let role = self.live_role(assignment.role_uuid)?;
            let effective = self.effective_permission_ids(role.uuid)?;
            grants.push(Grant { role, effective });
        }

        Ok(grants)
    }

    fn evaluate(
        &self,
        principal: &Principal,
        code: &str,
        context: Option<&AccessContext>,
        grants: &[Grant<'_>],
        at: DateTime<Utc>,
    ) -> AccessCheckResult {
        let Some(permission) = self.permission_by_code(code) else {
            return AccessCheckResult::denied(format!("Unknown permission '{}'", code), at);
        };

        let granting: Vec<&Grant<'_>> = grants
            .iter()
            .filter(|g| g.effective.contains(&permission.uuid))
            .collect();
        if granting.is_empty() {
            return AccessCheckResult::denied(
                format!("No active role grants '{}'", code),
                at,
            );
        }

        let held: BTreeSet<Uuid> = grants.iter().flat_map(|g| g.effective.iter().copied()).collect();
        if let Some(dep) = permission.dependencies.iter().find(|d| !held.contains(d)) {
            return AccessCheckResult::denied(
                format!(
                    "'{}' requires '{}', which is not held",
                    code,
                    self.permission_label(*dep)
                ),
                at,
            );
        }

        let target = context.and_then(|c| match permission.scope {
            PermissionScope::Global => Some(""),
            PermissionScope::Object => c.object.as_deref(),
            PermissionScope::Group => c.group.as_deref(),
            PermissionScope::User => c.target_user.as_deref(),
        });
        if permission.scope != PermissionScope::Global && target.is_none() {
            return AccessCheckResult::denied(
                format!("Scope {} requires a target in the context", permission.scope),
                at,
            );
        }

        let mut applied = Vec::new();
        for restriction in &permission.restrictions {
            if !restriction.admits(principal, context, at) {
                return AccessCheckResult::denied(
                    format!("Blocked by restriction {}", restriction.name()),
                    at,
                );
            }
            applied.push(restriction.name());
        }

        let time = at.time();
        let admitted: Vec<&Grant<'_>> = granting
            .into_iter()
            .filter(|g| {
                g.role
                    .limitations
                    .access_hours
                    .is_none_or(|hours| hours.contains(time))
            })
            .collect();
        if admitted.is_empty() {
            return AccessCheckResult::denied(
                format!("'{}' is outside the access hours of every granting role", code),
                at,
            );
        }

        let mut roles: Vec<String> = Vec::new();
        for grant in admitted {
            if let Some(hours) = grant.role.limitations.access_hours {
                applied.push(format!("horaires_acces:{}", hours));
            }
            roles.push(grant.role.code.clone());
        }
        roles.sort();
        roles.dedup();
        applied.dedup();

        AccessCheckResult::granted(roles, applied, at)
    }
}

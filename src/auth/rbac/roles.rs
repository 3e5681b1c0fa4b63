//! Role registry methods

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::models::{
    AuditAction, AuditTarget, CreateRole, Page, PageRequest, Permission, Role, RoleFilter,
    RoleHierarchy, UpdateRole,
};
use crate::utils::error::{RbacError, Result};

use super::helpers::{Overrides, RoleGraph};
use super::state::{AuditRecord, RbacState};
use super::system::RbacSystem;
use super::validation;

impl RbacSystem {
    /// Create a role, optionally under a parent
    pub async fn create_role(&self, input: CreateRole, actor: &str) -> Result<Role> {
        validation::role_code(&input.code)?;
        validation::name(&input.name)?;
        validation::level(input.level)?;
        if let Some(hours) = &input.limitations.access_hours {
            validation::daily_window(hours)?;
        }

        let mut state = self.state.write().await;
        if state.role_codes.contains_key(&input.code) {
            return Err(RbacError::validation(format!(
                "Role code '{}' already exists",
                input.code
            )));
        }

        let permissions: BTreeSet<Uuid> = input.permissions.iter().copied().collect();
        for uuid in &permissions {
            state.permission(*uuid)?;
        }

        let mut effective = BTreeSet::new();
        if let Some(parent) = input.parent_uuid {
            let depth = state.chain_depth(parent)? + 1;
            if depth > self.config.max_hierarchy_depth {
                return Err(RbacError::validation(format!(
                    "Role hierarchy would be {} levels deep, the limit is {}",
                    depth, self.config.max_hierarchy_depth
                )));
            }
            effective = state.effective_permission_ids(parent)?;
        }
        effective.extend(permissions.iter().copied());
        if let Some((a, b)) = state.conflicting_pair(&effective) {
            return Err(RbacError::validation(format!(
                "Role '{}' would hold conflicting permissions {} and {}",
                input.code,
                state.permission_label(a),
                state.permission_label(b)
            )));
        }

        let now = self.clock.now();
        let role = Role {
            uuid: Uuid::new_v4(),
            code: input.code,
            name: input.name,
            description: input.description,
            level: input.level,
            parent_uuid: input.parent_uuid,
            permissions,
            is_default: input.is_default,
            is_editable: input.is_editable,
            is_visible: input.is_visible,
            principal_types: input.principal_types,
            limitations: input.limitations,
            version: 1,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };

        state.role_codes.insert(role.code.clone(), role.uuid);
        state.roles.insert(role.uuid, role.clone());
        state.append_audit(
            AuditRecord {
                action: AuditAction::RoleCreated,
                target_type: AuditTarget::Role,
                target_uuid: Some(role.uuid),
                actor: Some(actor.to_string()),
                principal: None,
                details: json!({
                    "code": role.code,
                    "parent_uuid": role.parent_uuid,
                    "permissions": role.permissions.len(),
                }),
            },
            now,
        );

        info!(role = %role.uuid, code = %role.code, "Role created");
        Ok(role)
    }

    /// Patch role metadata, flags and limitations
    pub async fn update_role(
        &self,
        uuid: Uuid,
        patch: UpdateRole,
        expected_version: Option<u64>,
        actor: &str,
    ) -> Result<Role> {
        let mut state = self.state.write().await;
        let mut role = state.live_role(uuid)?.clone();
        check_version(&role, expected_version)?;
        if !role.is_editable && !patch.only_toggles_editable() {
            return Err(frozen(&role));
        }
        if let Some(level) = patch.level {
            validation::level(level)?;
        }
        if let Some(name) = &patch.name {
            validation::name(name)?;
        }
        if let Some(hours) = patch
            .limitations
            .as_ref()
            .and_then(|l| l.access_hours.as_ref())
        {
            validation::daily_window(hours)?;
        }

        let details = serde_json::to_value(&patch)?;
        patch.apply_to(&mut role);
        let role = state.commit_role(
            role,
            AuditAction::RoleUpdated,
            actor,
            details,
            self.clock.now(),
        );

        info!(role = %uuid, version = role.version, "Role updated");
        Ok(role)
    }

    /// Move a role under another parent, or make it a root with `None`
    pub async fn set_parent(
        &self,
        uuid: Uuid,
        parent: Option<Uuid>,
        expected_version: Option<u64>,
        actor: &str,
    ) -> Result<Role> {
        let mut state = self.state.write().await;
        let mut role = state.live_role(uuid)?.clone();
        ensure_editable(&role)?;
        check_version(&role, expected_version)?;

        if let Some(parent) = parent {
            if parent == uuid {
                return Err(RbacError::cycle(format!(
                    "Role '{}' cannot inherit from itself",
                    role.code
                )));
            }
            state.live_role(parent)?;
            if state.descendants(uuid).contains(&parent) {
                return Err(RbacError::cycle(format!(
                    "Role '{}' is a descendant of '{}'",
                    state.role_label(parent),
                    role.code
                )));
            }
            let depth = state.chain_depth(parent)? + state.subtree_height(uuid);
            if depth > self.config.max_hierarchy_depth {
                return Err(RbacError::validation(format!(
                    "Role hierarchy would be {} levels deep, the limit is {}",
                    depth, self.config.max_hierarchy_depth
                )));
            }
        }
        if role.parent_uuid == parent {
            return Ok(role);
        }

        state.validate_subtree(uuid, Overrides::parent(uuid, parent))?;

        let details = json!({ "from": role.parent_uuid, "to": parent });
        role.parent_uuid = parent;
        let role = state.commit_role(
            role,
            AuditAction::RoleParentChanged,
            actor,
            details,
            self.clock.now(),
        );

        info!(role = %uuid, parent = ?parent, "Role parent changed");
        Ok(role)
    }

    /// Grant one permission to a role; granting a held permission is a no-op
    pub async fn add_permission(
        &self,
        role_uuid: Uuid,
        permission_uuid: Uuid,
        expected_version: Option<u64>,
        actor: &str,
    ) -> Result<Role> {
        let mut state = self.state.write().await;
        let mut role = state.live_role(role_uuid)?.clone();
        ensure_editable(&role)?;
        check_version(&role, expected_version)?;
        let code = state.permission(permission_uuid)?.code.clone();

        if role.permissions.contains(&permission_uuid) {
            return Ok(role);
        }

        let mut next = role.permissions.clone();
        next.insert(permission_uuid);
        state.validate_subtree(role_uuid, Overrides::permissions(role_uuid, &next))?;

        role.permissions = next;
        let role = state.commit_role(
            role,
            AuditAction::RolePermissionAdded,
            actor,
            json!({ "permission": code }),
            self.clock.now(),
        );

        info!(role = %role_uuid, permission = %code, "Permission added to role");
        Ok(role)
    }

    /// Withdraw one permission; a mandatory permission needs a substitute
    pub async fn remove_permission(
        &self,
        role_uuid: Uuid,
        permission_uuid: Uuid,
        substitute: Option<Uuid>,
        expected_version: Option<u64>,
        actor: &str,
    ) -> Result<Role> {
        let mut state = self.state.write().await;
        let mut role = state.live_role(role_uuid)?.clone();
        ensure_editable(&role)?;
        check_version(&role, expected_version)?;

        if !role.permissions.contains(&permission_uuid) {
            return Err(RbacError::not_found("role_permission", permission_uuid));
        }
        let permission = state.permission(permission_uuid)?;
        let code = permission.code.clone();
        if permission.is_mandatory && substitute.is_none() {
            return Err(RbacError::conflict(format!(
                "Permission '{}' is mandatory for role '{}' and needs a substitute",
                code, role.code
            )));
        }

        let mut next = role.permissions.clone();
        next.remove(&permission_uuid);
        let substitute_code = match substitute {
            Some(sub) if sub == permission_uuid => {
                return Err(RbacError::validation(
                    "A permission cannot substitute for itself",
                ));
            }
            Some(sub) => {
                let sub_code = state.permission(sub)?.code.clone();
                next.insert(sub);
                state.validate_subtree(role_uuid, Overrides::permissions(role_uuid, &next))?;
                Some(sub_code)
            }
            None => None,
        };

        role.permissions = next;
        let role = state.commit_role(
            role,
            AuditAction::RolePermissionRemoved,
            actor,
            json!({ "permission": code, "substitute": substitute_code }),
            self.clock.now(),
        );

        info!(role = %role_uuid, permission = %code, "Permission removed from role");
        Ok(role)
    }

    /// Replace the role's own permissions with exactly `permissions`, all or nothing
    pub async fn replace_permissions(
        &self,
        role_uuid: Uuid,
        permissions: Vec<Uuid>,
        expected_version: Option<u64>,
        actor: &str,
    ) -> Result<Role> {
        let mut state = self.state.write().await;
        let mut role = state.live_role(role_uuid)?.clone();
        ensure_editable(&role)?;
        check_version(&role, expected_version)?;

        let next: BTreeSet<Uuid> = permissions.into_iter().collect();
        for uuid in &next {
            state.permission(*uuid)?;
        }
        if next == role.permissions {
            return Ok(role);
        }

        if let Some(dropped) = role
            .permissions
            .difference(&next)
            .filter_map(|uuid| state.permissions.get(uuid))
            .find(|p| p.is_mandatory)
        {
            return Err(RbacError::conflict(format!(
                "Permission '{}' is mandatory for role '{}' and cannot be dropped",
                dropped.code, role.code
            )));
        }

        let overrides = Overrides::permissions(role_uuid, &next);
        state.validate_subtree(role_uuid, overrides)?;

        let effective = state.effective_with(role_uuid, overrides)?;
        if let Some((uuid, dep)) = state.missing_dependency(&next, &effective) {
            return Err(RbacError::validation(format!(
                "Permission {} requires {}, which the role would not hold",
                state.permission_label(uuid),
                state.permission_label(dep)
            )));
        }

        let labels = |set: Vec<&Uuid>| -> Vec<String> {
            set.into_iter().map(|u| state.permission_label(*u)).collect()
        };
        let details = json!({
            "added": labels(next.difference(&role.permissions).collect()),
            "removed": labels(role.permissions.difference(&next).collect()),
            "count": next.len(),
        });

        role.permissions = next;
        let role = state.commit_role(
            role,
            AuditAction::RolePermissionsReplaced,
            actor,
            details,
            self.clock.now(),
        );

        info!(role = %role_uuid, count = role.permissions.len(), "Role permissions replaced");
        Ok(role)
    }

    /// Own and inherited permissions, sorted by code
    pub async fn resolve_effective_permissions(&self, role_uuid: Uuid) -> Result<Vec<Permission>> {
        let state = self.state.read().await;
        let ids = state.effective_permission_ids(role_uuid)?;
        Ok(state.permissions_sorted(&ids))
    }

    pub async fn resolve_effective_permission_ids(&self, role_uuid: Uuid) -> Result<BTreeSet<Uuid>> {
        let state = self.state.read().await;
        state.effective_permission_ids(role_uuid)
    }

    pub async fn get_role(&self, uuid: Uuid) -> Result<Role> {
        let state = self.state.read().await;
        state.live_role(uuid).cloned()
    }

    pub async fn get_role_by_code(&self, code: &str) -> Result<Role> {
        let state = self.state.read().await;
        state
            .role_codes
            .get(code)
            .and_then(|uuid| state.live_role(*uuid).ok())
            .cloned()
            .ok_or_else(|| RbacError::not_found("role", code))
    }

    pub async fn list_roles(&self, filter: &RoleFilter, page: PageRequest) -> Result<Page<Role>> {
        let page = self.page_request(page);
        let state = self.state.read().await;
        let mut items: Vec<Role> = state
            .live_roles()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        filter.sort(&mut items);

        debug!(total = items.len(), "Listing roles");
        Ok(Page::paginate(items, page))
    }

    /// The role's own permissions, without inherited ones
    pub async fn get_role_permissions(&self, role_uuid: Uuid) -> Result<Vec<Permission>> {
        let state = self.state.read().await;
        let role = state.live_role(role_uuid)?;
        Ok(state.permissions_sorted(&role.permissions))
    }

    pub async fn role_hierarchy(&self, role_uuid: Uuid) -> Result<RoleHierarchy> {
        let state = self.state.read().await;
        let mut seen = HashSet::new();
        state.hierarchy_from(role_uuid, &mut seen)
    }

    /// Soft delete; refused while assignments or child roles depend on the role
    pub async fn delete_role(&self, uuid: Uuid, actor: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let mut role = state.live_role(uuid)?.clone();
        ensure_editable(&role)?;

        let holders = state
            .assignments
            .values()
            .filter(|a| a.role_uuid == uuid && !a.is_terminal())
            .count();
        if holders > 0 {
            return Err(RbacError::conflict(format!(
                "Role '{}' still has {} active assignment(s)",
                role.code, holders
            )));
        }
        if let Some(child) = state.live_roles().find(|r| r.parent_uuid == Some(uuid)) {
            return Err(RbacError::conflict(format!(
                "Role '{}' is the parent of '{}'",
                role.code, child.code
            )));
        }

        let now = self.clock.now();
        role.deleted_at = Some(now);
        let code = role.code.clone();
        state.commit_role(
            role,
            AuditAction::RoleDeleted,
            actor,
            json!({ "code": code }),
            now,
        );

        info!(role = %uuid, code = %code, "Role deleted");
        Ok(())
    }
}

impl RbacState {
    /// Bump the version, store the role and append its audit entry
    fn commit_role(
        &mut self,
        mut role: Role,
        action: AuditAction,
        actor: &str,
        details: serde_json::Value,
        at: DateTime<Utc>,
    ) -> Role {
        role.version += 1;
        role.updated_at = at;
        self.roles.insert(role.uuid, role.clone());
        self.append_audit(
            AuditRecord {
                action,
                target_type: AuditTarget::Role,
                target_uuid: Some(role.uuid),
                actor: Some(actor.to_string()),
                principal: None,
                details,
            },
            at,
        );
        role
    }

    pub(super) fn permissions_sorted(&self, ids: &BTreeSet<Uuid>) -> Vec<Permission> {
        let mut permissions: Vec<Permission> = ids
            .iter()
            .filter_map(|uuid| self.permissions.get(uuid))
            .cloned()
            .collect();
        permissions.sort_by(|a, b| a.code.cmp(&b.code));
        permissions
    }

    fn hierarchy_from(&self, uuid: Uuid, seen: &mut HashSet<Uuid>) -> Result<RoleHierarchy> {
        if !seen.insert(uuid) {
            return Err(RbacError::cycle(format!(
                "Role hierarchy loops back to {}",
                self.role_label(uuid)
            )));
        }
        let role = self.live_role(uuid)?.clone();
        let mut child_ids: Vec<(String, Uuid)> = self
            .live_roles()
            .filter(|r| r.parent_uuid == Some(uuid))
            .map(|r| (r.code.clone(), r.uuid))
            .collect();
        child_ids.sort();

        let children = child_ids
            .into_iter()
            .map(|(_, child)| self.hierarchy_from(child, seen))
            .collect::<Result<Vec<_>>>()?;
        Ok(RoleHierarchy { role, children })
    }
}

fn check_version(role: &Role, expected: Option<u64>) -> Result<()> {
    match expected {
        Some(version) if version != role.version => Err(RbacError::conflict(format!(
            "Role '{}' was modified concurrently: expected version {}, found {}",
            role.code, version, role.version
        ))),
        _ => Ok(()),
    }
}

fn ensure_editable(role: &Role) -> Result<()> {
    if role.is_editable {
        Ok(())
    } else {
        Err(frozen(role))
    }
}

fn frozen(role: &Role) -> RbacError {
    RbacError::immutable(format!("Role '{}' is not editable", role.code))
}

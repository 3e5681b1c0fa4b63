//! Permission registry methods

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::models::{
    AuditAction, AuditTarget, CreatePermission, Page, PageRequest, Permission, PermissionFilter,
    UpdatePermission,
};
use crate::utils::error::{RbacError, Result};

use super::helpers::RoleGraph;
use super::state::{AuditRecord, RbacState};
use super::system::RbacSystem;
use super::validation;

impl RbacSystem {
    /// Register a new permission
    pub async fn create_permission(
        &self,
        input: CreatePermission,
        actor: &str,
    ) -> Result<Permission> {
        validation::permission_code(&input.code)?;
        validation::name(&input.name)?;
        validation::level(input.level)?;

        let mut state = self.state.write().await;
        if state.permission_codes.contains_key(&input.code) {
            return Err(RbacError::validation(format!(
                "Permission code '{}' already exists",
                input.code
            )));
        }
        check_relations(&state, None, &input.dependencies, &input.conflicts)?;

        let now = self.clock.now();
        let permission = Permission {
            uuid: Uuid::new_v4(),
            code: input.code,
            name: input.name,
            description: input.description,
            category: input.category,
            subcategory: input.subcategory,
            module: input.module,
            service: input.service,
            scope: input.scope,
            kind: input.kind,
            level: input.level,
            is_system: input.is_system,
            is_mandatory: input.is_mandatory,
            is_hidden: input.is_hidden,
            dependencies: input.dependencies,
            conflicts: input.conflicts,
            groups: input.groups,
            tags: input.tags,
            restrictions: input.restrictions,
            usage_count: 0,
            last_used_at: None,
            created_at: now,
            updated_at: now,
        };

        state
            .permission_codes
            .insert(permission.code.clone(), permission.uuid);
        state.permissions.insert(permission.uuid, permission.clone());
        state.append_audit(
            AuditRecord {
                action: AuditAction::PermissionCreated,
                target_type: AuditTarget::Permission,
                target_uuid: Some(permission.uuid),
                actor: Some(actor.to_string()),
                principal: None,
                details: json!({ "code": permission.code }),
            },
            now,
        );

        info!(permission = %permission.uuid, code = %permission.code, "Permission created");
        Ok(permission)
    }

    /// Patch a permission; system permissions only accept usage counters
    pub async fn update_permission(
        &self,
        uuid: Uuid,
        patch: UpdatePermission,
        actor: &str,
    ) -> Result<Permission> {
        let mut state = self.state.write().await;
        let current = state.permission(uuid)?.clone();

        if current.is_system && !patch.touches_only_usage() {
            return Err(RbacError::immutable(format!(
                "System permission '{}' only accepts usage counter updates",
                current.code
            )));
        }
        if patch.is_empty() {
            return Ok(current);
        }
        if let Some(level) = patch.level {
            validation::level(level)?;
        }
        if let Some(name) = &patch.name {
            validation::name(name)?;
        }

        let details = serde_json::to_value(&patch)?;
        let mut updated = current.clone();
        patch.apply_to(&mut updated);
        check_relations(
            &state,
            Some(uuid),
            &updated.dependencies,
            &updated.conflicts,
        )?;

        let now = self.clock.now();
        updated.updated_at = now;
        let conflicts_changed = updated.conflicts != current.conflicts;
        state.permissions.insert(uuid, updated.clone());

        if conflicts_changed {
            if let Some(role) = role_with_conflict(&state) {
                state.permissions.insert(uuid, current);
                return Err(RbacError::conflict(format!(
                    "New conflicts of '{}' clash with the permissions of role {}",
                    updated.code, role
                )));
            }
        }

        state.append_audit(
            AuditRecord {
                action: AuditAction::PermissionUpdated,
                target_type: AuditTarget::Permission,
                target_uuid: Some(uuid),
                actor: Some(actor.to_string()),
                principal: None,
                details,
            },
            now,
        );

        info!(permission = %uuid, code = %updated.code, "Permission updated");
        Ok(updated)
    }

    /// Remove a permission that nothing references any more
    pub async fn delete_permission(&self, uuid: Uuid, actor: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let permission = state.permission(uuid)?;

        if permission.is_system {
            return Err(RbacError::conflict(format!(
                "System permission '{}' cannot be deleted",
                permission.code
            )));
        }

        let holders: Vec<String> = state
            .live_roles()
            .filter(|r| r.permissions.contains(&uuid))
            .map(|r| r.code.clone())
            .collect();
        if !holders.is_empty() {
            return Err(RbacError::conflict(format!(
                "Permission '{}' is still granted to roles: {}",
                permission.code,
                holders.join(", ")
            )));
        }

        if let Some(other) = state
            .permissions
            .values()
            .find(|p| p.dependencies.contains(&uuid) || p.conflicts.contains(&uuid))
        {
            return Err(RbacError::conflict(format!(
                "Permission '{}' is referenced by '{}'",
                permission.code, other.code
            )));
        }

        let code = permission.code.clone();
        state.permission_codes.remove(&code);
        state.permissions.remove(&uuid);
        state.append_audit(
            AuditRecord {
                action: AuditAction::PermissionDeleted,
                target_type: AuditTarget::Permission,
                target_uuid: Some(uuid),
                actor: Some(actor.to_string()),
                principal: None,
                details: json!({ "code": code }),
            },
            self.clock.now(),
        );

        info!(permission = %uuid, code = %code, "Permission deleted");
        Ok(())
    }

    pub async fn get_permission(&self, uuid: Uuid) -> Result<Permission> {
        let state = self.state.read().await;
        state.permission(uuid).cloned()
    }

    pub async fn get_permission_by_code(&self, code: &str) -> Result<Permission> {
        let state = self.state.read().await;
        state
            .permission_by_code(code)
            .cloned()
            .ok_or_else(|| RbacError::not_found("permission", code))
    }

    /// Filtered, sorted and paginated listing
    pub async fn list_permissions(
        &self,
        filter: &PermissionFilter,
        page: PageRequest,
    ) -> Result<Page<Permission>> {
        let page = self.page_request(page);
        let state = self.state.read().await;
        let mut items: Vec<Permission> = state
            .permissions
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        filter.sort(&mut items);

        debug!(total = items.len(), "Listing permissions");
        Ok(Page::paginate(items, page))
    }

    /// Bump usage counters after a granted check
    pub async fn record_usage(&self, code: &str) -> Result<Permission> {
        let mut state = self.state.write().await;
        state.bump_usage(code, self.clock.now())
    }
}

impl RbacState {
    pub(super) fn bump_usage(&mut self, code: &str, at: DateTime<Utc>) -> Result<Permission> {
        let uuid = *self
            .permission_codes
            .get(code)
            .ok_or_else(|| RbacError::not_found("permission", code))?;
        let permission = self
            .permissions
            .get_mut(&uuid)
            .ok_or_else(|| RbacError::not_found("permission", uuid))?;
        permission.usage_count += 1;
        permission.last_used_at = Some(at);
        Ok(permission.clone())
    }
}

/// Dependencies and conflicts must be disjoint, exist, and not point at the permission itself
fn check_relations(
    state: &RbacState,
    own: Option<Uuid>,
    dependencies: &BTreeSet<Uuid>,
    conflicts: &BTreeSet<Uuid>,
) -> Result<()> {
    if let Some(both) = dependencies.intersection(conflicts).next() {
        return Err(RbacError::validation(format!(
            "Permission {} cannot be both a dependency and a conflict",
            state.permission_label(*both)
        )));
    }
    if let Some(own) = own {
        if dependencies.contains(&own) || conflicts.contains(&own) {
            return Err(RbacError::validation(
                "A permission cannot depend on or conflict with itself",
            ));
        }
    }
    for uuid in dependencies.iter().chain(conflicts) {
        state.permission(*uuid)?;
    }
    Ok(())
}

/// Code of the first live role whose effective set contains a conflicting pair
fn role_with_conflict(state: &RbacState) -> Option<String> {
    state.live_roles().find_map(|role| {
        state
            .effective_permission_ids(role.uuid)
            .ok()
            .and_then(|set| state.conflicting_pair(&set))
            .map(|_| role.code.clone())
    })
}

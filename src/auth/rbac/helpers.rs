//! Hierarchy and permission-set helpers over the engine state

use std::collections::{BTreeSet, HashSet, VecDeque};

use uuid::Uuid;

use crate::core::models::Role;
use crate::utils::error::{RbacError, Result};

use super::state::RbacState;

/// A pending change evaluated against the hierarchy before it is committed
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct Overrides<'a> {
    permissions: Option<(Uuid, &'a BTreeSet<Uuid>)>,
    parent: Option<(Uuid, Option<Uuid>)>,
}

impl<'a> Overrides<'a> {
    pub fn permissions(role: Uuid, set: &'a BTreeSet<Uuid>) -> Self {
        Self {
            permissions: Some((role, set)),
            parent: None,
        }
    }

    pub fn parent(role: Uuid, parent: Option<Uuid>) -> Self {
        Self {
            permissions: None,
            parent: Some((role, parent)),
        }
    }

    fn own<'r>(&self, role: &'r Role) -> &'r BTreeSet<Uuid>
    where
        'a: 'r,
    {
        match self.permissions {
            Some((uuid, set)) if uuid == role.uuid => set,
            _ => &role.permissions,
        }
    }

    fn parent_of(&self, role: &Role) -> Option<Uuid> {
        match self.parent {
            Some((uuid, parent)) if uuid == role.uuid => parent,
            _ => role.parent_uuid,
        }
    }
}

pub(super) trait RoleGraph {
    /// Own plus inherited permissions of a role
    fn effective_permission_ids(&self, role: Uuid) -> Result<BTreeSet<Uuid>>;

    fn effective_with(&self, role: Uuid, overrides: Overrides<'_>) -> Result<BTreeSet<Uuid>>;

    /// Live roles below `role`, breadth first
    fn descendants(&self, role: Uuid) -> Vec<Uuid>;

    /// Number of roles from `role` up to its root, inclusive
    fn chain_depth(&self, role: Uuid) -> Result<usize>;

    /// Number of levels in the subtree rooted at `role`, inclusive
    fn subtree_height(&self, role: Uuid) -> usize;

    fn conflicting_pair(&self, set: &BTreeSet<Uuid>) -> Option<(Uuid, Uuid)>;

    /// First `(permission, dependency)` in `granted` whose dependency is not in `held`
    fn missing_dependency(
        &self,
        granted: &BTreeSet<Uuid>,
        held: &BTreeSet<Uuid>,
    ) -> Option<(Uuid, Uuid)>;

    /// Reject the change if `root` or any descendant would hold a conflicting pair
    fn validate_subtree(&self, root: Uuid, overrides: Overrides<'_>) -> Result<()>;
}

impl RoleGraph for RbacState {
    fn effective_permission_ids(&self, role: Uuid) -> Result<BTreeSet<Uuid>> {
        self.effective_with(role, Overrides::default())
    }

    fn effective_with(&self, role: Uuid, overrides: Overrides<'_>) -> Result<BTreeSet<Uuid>> {
        let mut effective = BTreeSet::new();
        let mut visited = HashSet::new();
        let mut current = Some(role);

        while let Some(uuid) = current {
            if !visited.insert(uuid) {
                return Err(RbacError::cycle(format!(
                    "Role hierarchy loops back to {}",
                    self.role_label(uuid)
                )));
            }
            let role = self.live_role(uuid)?;
            effective.extend(overrides.own(role).iter().copied());
            current = overrides.parent_of(role);
        }

        Ok(effective)
    }

    fn descendants(&self, role: Uuid) -> Vec<Uuid> {
        let mut found = Vec::new();
        let mut seen = HashSet::from([role]);
        let mut queue = VecDeque::from([role]);

        while let Some(current) = queue.pop_front() {
            for child in self.live_roles().filter(|r| r.parent_uuid == Some(current)) {
                if seen.insert(child.uuid) {
                    found.push(child.uuid);
                    queue.push_back(child.uuid);
                }
            }
        }

        found
    }

    fn chain_depth(&self, role: Uuid) -> Result<usize> {
        let mut depth = 0;
        let mut visited = HashSet::new();
        let mut current = Some(role);

        while let Some(uuid) = current {
            if !visited.insert(uuid) {
                return Err(RbacError::cycle(format!(
                    "Role hierarchy loops back to {}",
                    self.role_label(uuid)
                )));
            }
            depth += 1;
            current = self.live_role(uuid)?.parent_uuid;
        }

        Ok(depth)
    }

    fn subtree_height(&self, role: Uuid) -> usize {
        let mut height = 0;
        let mut seen = HashSet::from([role]);
        let mut level = vec![role];

        while !level.is_empty() {
            height += 1;
            let mut next = Vec::new();
            for parent in &level {
                for child in self.live_roles().filter(|r| r.parent_uuid == Some(*parent)) {
                    if seen.insert(child.uuid) {
                        next.push(child.uuid);
                    }
                }
            }
            level = next;
        }

        height
    }

    fn conflicting_pair(&self, set: &BTreeSet<Uuid>) -> Option<(Uuid, Uuid)> {
        set.iter().find_map(|uuid| {
            self.permissions.get(uuid).and_then(|permission| {
                permission
                    .conflicts
                    .iter()
                    .find(|other| set.contains(other))
                    .map(|other| (*uuid, *other))
            })
        })
    }

    fn missing_dependency(
        &self,
        granted: &BTreeSet<Uuid>,
        held: &BTreeSet<Uuid>,
    ) -> Option<(Uuid, Uuid)> {
        granted.iter().find_map(|uuid| {
            self.permissions.get(uuid).and_then(|permission| {
                permission
                    .dependencies
                    .iter()
                    .find(|dep| !held.contains(dep))
                    .map(|dep| (*uuid, *dep))
            })
        })
    }

    fn validate_subtree(&self, root: Uuid, overrides: Overrides<'_>) -> Result<()> {
        let mut roles = vec![root];
        roles.extend(self.descendants(root));

        for role in roles {
            let effective = self.effective_with(role, overrides)?;
            if let Some((a, b)) = self.conflicting_pair(&effective) {
                return Err(RbacError::validation(format!(
                    "Role {} would hold conflicting permissions {} and {}",
                    self.role_label(role),
                    self.permission_label(a),
                    self.permission_label(b)
                )));
            }
        }

        Ok(())
    }
}

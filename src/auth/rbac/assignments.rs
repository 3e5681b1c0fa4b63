//! Role assignment lifecycle

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::models::{
    AssignmentStatus, AuditAction, AuditTarget, CreateAssignment, Principal, RoleAssignment,
    ValidityWindow,
};
use crate::utils::error::{RbacError, Result};

use super::state::{AuditRecord, RbacState};
use super::system::RbacSystem;
use super::validation;

/// User-triggered lifecycle transitions; expiry is left to the sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Revoke,
    Suspend,
    Reactivate,
}

impl Transition {
    fn name(self) -> &'static str {
        match self {
            Transition::Revoke => "revoke",
            Transition::Suspend => "suspend",
            Transition::Reactivate => "reactivate",
        }
    }

    fn allowed_from(self, status: AssignmentStatus) -> bool {
        match self {
            Transition::Revoke => !status.is_terminal(),
            Transition::Suspend => status == AssignmentStatus::Active,
            Transition::Reactivate => status == AssignmentStatus::Suspended,
        }
    }

    fn target(self) -> AssignmentStatus {
        match self {
            Transition::Revoke => AssignmentStatus::Inactive,
            Transition::Suspend => AssignmentStatus::Suspended,
            Transition::Reactivate => AssignmentStatus::Active,
        }
    }

    fn audit_action(self) -> AuditAction {
        match self {
            Transition::Revoke => AuditAction::AssignmentRevoked,
            Transition::Suspend => AuditAction::AssignmentSuspended,
            Transition::Reactivate => AuditAction::AssignmentReactivated,
        }
    }
}

impl RbacSystem {
    /// Grant a role to a principal for a validity window
    pub async fn assign(&self, input: CreateAssignment) -> Result<RoleAssignment> {
        let mut state = self.state.write().await;
        let now = self.clock.now();
        let assignment = state.prepare_assignment(input, now)?;
        let assignment = state.commit_assignment(assignment, now);

        info!(
            assignment = %assignment.uuid,
            principal = %assignment.principal,
            role = %assignment.role_uuid,
            "Role assigned"
        );
        Ok(assignment)
    }

    /// `actif`/`suspendu` → `inactif`
    pub async fn revoke(&self, uuid: Uuid, motif: &str, actor: &str) -> Result<RoleAssignment> {
        let motif = validation::motif(motif)?;
        self.transition(uuid, Transition::Revoke, Some(motif), actor)
            .await
    }

    /// `actif` → `suspendu`
    pub async fn suspend(&self, uuid: Uuid, motif: &str, actor: &str) -> Result<RoleAssignment> {
        let motif = validation::motif(motif)?;
        self.transition(uuid, Transition::Suspend, Some(motif), actor)
            .await
    }

    /// `suspendu` → `actif`
    pub async fn reactivate(&self, uuid: Uuid, actor: &str) -> Result<RoleAssignment> {
        self.transition(uuid, Transition::Reactivate, None, actor)
            .await
    }

    async fn transition(
        &self,
        uuid: Uuid,
        transition: Transition,
        motif: Option<String>,
        actor: &str,
    ) -> Result<RoleAssignment> {
        let mut state = self.state.write().await;
        let mut assignment = state.assignment(uuid)?.clone();
        if !transition.allowed_from(assignment.status) {
            return Err(RbacError::invalid_state(
                assignment.status,
                transition.name(),
            ));
        }

        let now = self.clock.now();
        let from = assignment.status;
        assignment.status = transition.target();
        assignment.updated_at = now;
        match transition {
            Transition::Revoke | Transition::Suspend => {
                assignment.revoked_by = Some(actor.to_string());
                assignment.revoked_at = Some(now);
                assignment.revocation_reason = motif.clone();
            }
            Transition::Reactivate => {
                assignment.revoked_by = None;
                assignment.revoked_at = None;
                assignment.revocation_reason = None;
            }
        }

        state.assignments.insert(uuid, assignment.clone());
        state.append_audit(
            AuditRecord {
                action: transition.audit_action(),
                target_type: AuditTarget::RoleAssignment,
                target_uuid: Some(uuid),
                actor: Some(actor.to_string()),
                principal: Some(assignment.principal.clone()),
                details: json!({
                    "from": from,
                    "to": assignment.status,
                    "motif": motif,
                    "role_uuid": assignment.role_uuid,
                }),
            },
            now,
        );

        info!(
            assignment = %uuid,
            from = %from,
            to = %assignment.status,
            "Assignment {}",
            transition.name()
        );
        Ok(assignment)
    }

    /// Move every `actif` assignment whose window has ended to `expire`
    ///
    /// Returns the number of transitions; a second run at the same instant returns 0.
    pub async fn expire_assignments(&self) -> Result<usize> {
        let mut state = self.state.write().await;
        let now = self.clock.now();

        let due: Vec<Uuid> = state
            .assignments
            .values()
            .filter(|a| a.status == AssignmentStatus::Active && a.window.has_ended(now))
            .map(|a| a.uuid)
            .collect();

        for uuid in &due {
            let Some(assignment) = state.assignments.get_mut(uuid) else {
                continue;
            };
            assignment.status = AssignmentStatus::Expired;
            assignment.expired_at = Some(now);
            assignment.updated_at = now;
            let record = AuditRecord {
                action: AuditAction::AssignmentExpired,
                target_type: AuditTarget::RoleAssignment,
                target_uuid: Some(*uuid),
                actor: None,
                principal: Some(assignment.principal.clone()),
                details: json!({
                    "role_uuid": assignment.role_uuid,
                    "date_fin": assignment.window.ends_at,
                }),
            };
            state.append_audit(record, now);
        }

        if due.is_empty() {
            debug!("No assignments due for expiry");
        } else {
            info!(count = due.len(), "Assignments expired");
        }
        Ok(due.len())
    }

    pub async fn get_assignment(&self, uuid: Uuid) -> Result<RoleAssignment> {
        let state = self.state.read().await;
        state.assignment(uuid).cloned()
    }

    /// All assignments of a principal, oldest first
    pub async fn list_assignments_for_principal(
        &self,
        principal: &Principal,
    ) -> Result<Vec<RoleAssignment>> {
        let state = self.state.read().await;
        Ok(state.assignments_where(|a| a.principal == *principal))
    }

    pub async fn list_assignments_for_role(&self, role_uuid: Uuid) -> Result<Vec<RoleAssignment>> {
        let state = self.state.read().await;
        state.live_role(role_uuid)?;
        Ok(state.assignments_where(|a| a.role_uuid == role_uuid))
    }

    /// Assign every default role matching the principal's type that it does not hold yet
    pub async fn assign_default_roles(
        &self,
        principal: &Principal,
        actor: &str,
    ) -> Result<Vec<RoleAssignment>> {
        let mut state = self.state.write().await;
        let now = self.clock.now();

        let mut candidates: Vec<(String, Uuid)> = state
            .live_roles()
            .filter(|r| r.is_default && r.accepts_principal_type(&principal.user_type))
            .filter(|r| {
                !state.assignments.values().any(|a| {
                    a.role_uuid == r.uuid && a.principal == *principal && !a.is_terminal()
                })
            })
            .map(|r| (r.code.clone(), r.uuid))
            .collect();
        candidates.sort();

        let prepared = candidates
            .into_iter()
            .map(|(_, role_uuid)| {
                let input = CreateAssignment::new(
                    principal.clone(),
                    role_uuid,
                    ValidityWindow::open_ended(now),
                    actor,
                )
                .reason("default role");
                state.prepare_assignment(input, now)
            })
            .collect::<Result<Vec<_>>>()?;

        let assigned: Vec<RoleAssignment> = prepared
            .into_iter()
            .map(|a| state.commit_assignment(a, now))
            .collect();

        info!(principal = %principal, count = assigned.len(), "Default roles assigned");
        Ok(assigned)
    }
}

impl RbacState {
    /// Validate an assignment request against the role and current holders
    fn prepare_assignment(
        &self,
        input: CreateAssignment,
        now: DateTime<Utc>,
    ) -> Result<RoleAssignment> {
        if input.assigned_by.trim().is_empty() {
            return Err(RbacError::validation("attribue_par must not be empty"));
        }
        let role = self.live_role(input.role_uuid)?;
        if input.principal.user_type.trim().is_empty() {
            return Err(RbacError::validation("utilisateur_type must not be empty"));
        }

        let mut window = input.window;
        if let Some(days) = role.limitations.validity_days {
            let limit = window.starts_at + Duration::days(i64::from(days));
            match window.ends_at {
                None => window.ends_at = Some(limit),
                Some(end) if end > limit => {
                    return Err(RbacError::validation(format!(
                        "Role '{}' can be held for at most {} day(s)",
                        role.code, days
                    )));
                }
                Some(_) => {}
            }
        }
        validation::validity_window(&window)?;
        if window.has_ended(now) {
            return Err(RbacError::validation("date_fin is already in the past"));
        }
        if let Some(hours) = &role.limitations.access_hours {
            validation::daily_window(hours)?;
        }

        let held: Vec<&RoleAssignment> = self
            .assignments
            .values()
            .filter(|a| a.role_uuid == role.uuid && !a.is_terminal())
            .collect();

        if held
            .iter()
            .any(|a| a.principal == input.principal && a.window.overlaps(&window))
        {
            return Err(RbacError::conflict(format!(
                "{} already holds role '{}' over an overlapping window",
                input.principal, role.code
            )));
        }

        if let Some(max) = role.limitations.max_principals {
            let holders: HashSet<&Principal> = held.iter().map(|a| &a.principal).collect();
            if !holders.contains(&input.principal) && holders.len() >= max as usize {
                return Err(RbacError::validation(format!(
                    "Role '{}' is limited to {} principal(s)",
                    role.code, max
                )));
            }
        }

        Ok(RoleAssignment {
            uuid: Uuid::new_v4(),
            principal: input.principal,
            role_uuid: role.uuid,
            window,
            status: AssignmentStatus::Active,
            assigned_by: input.assigned_by,
            assigned_at: now,
            reason: input.reason,
            revoked_by: None,
            revoked_at: None,
            revocation_reason: None,
            expired_at: None,
            updated_at: now,
        })
    }

    fn commit_assignment(&mut self, assignment: RoleAssignment, now: DateTime<Utc>) -> RoleAssignment {
        let (code, level) = self
            .roles
            .get(&assignment.role_uuid)
            .map(|r| (r.code.clone(), r.level))
            .unwrap_or_default();

        self.assignments.insert(assignment.uuid, assignment.clone());
        self.append_audit(
            AuditRecord {
                action: AuditAction::AssignmentCreated,
                target_type: AuditTarget::RoleAssignment,
                target_uuid: Some(assignment.uuid),
                actor: Some(assignment.assigned_by.clone()),
                principal: Some(assignment.principal.clone()),
                details: json!({
                    "role_uuid": assignment.role_uuid,
                    "role": code,
                    "niveau": level,
                    "date_debut": assignment.window.starts_at,
                    "date_fin": assignment.window.ends_at,
                }),
            },
            now,
        );
        assignment
    }

    fn assignments_where<F>(&self, predicate: F) -> Vec<RoleAssignment>
    where
        F: Fn(&RoleAssignment) -> bool,
    {
        let mut found: Vec<RoleAssignment> = self
            .assignments
            .values()
            .filter(|a| predicate(a))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.assigned_at.cmp(&b.assigned_at).then(a.uuid.cmp(&b.uuid)));
        found
    }
}

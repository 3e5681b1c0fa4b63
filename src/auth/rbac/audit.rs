//! Audit log and security reporting

use std::collections::HashMap;

use serde_json::json;
use tracing::{debug, info};

use crate::core::models::{
    AccessCheckResult, AuditAction, AuditEntry, AuditFilter, AuditTarget,
    CountedItem, Page, PageRequest, Principal, ReportPeriod, SecurityReport,
};
use crate::utils::error::{RbacError, Result};

use super::state::AuditRecord;
use super::system::RbacSystem;

/// Entries kept in each "top denied" ranking
const TOP_DENIED: usize = 10;

/// Roles at or above this niveau count as privileged
const PRIVILEGED_LEVEL: u64 = 4;

impl RbacSystem {
    /// Audit entries matching `filter`, newest first
    pub async fn get_audit_log(
        &self,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> Result<Page<AuditEntry>> {
        let page = self.page_request(page);
        let state = self.state.read().await;
        let entries: Vec<AuditEntry> = state
            .audit_log
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        Ok(Page::paginate(entries, page))
    }

    /// Explicitly log the outcome of an access check
    ///
    /// Checks themselves never write; a granted check recorded here also bumps
    /// the permission usage counters.
    pub async fn record_access_check(
        &self,
        principal: &Principal,
        permission_code: &str,
        result: &AccessCheckResult,
        actor: &str,
    ) -> Result<AuditEntry> {
        let mut state = self.state.write().await;
        let now = self.clock.now();

        let target_uuid = state.permission_by_code(permission_code).map(|p| p.uuid);
        if result.granted && target_uuid.is_some() {
            state.bump_usage(permission_code, now)?;
        }

        let entry = state.append_audit(
            AuditRecord {
                action: AuditAction::AccessChecked,
                target_type: AuditTarget::AccessCheck,
                target_uuid,
                actor: Some(actor.to_string()),
                principal: Some(principal.clone()),
                details: json!({
                    "code": permission_code,
                    "autorise": result.granted,
                    "raison": result.reason,
                    "roles_sources": result.granted_by_roles,
                }),
            },
            now,
        );

        debug!(principal = %principal, permission = permission_code, "Access check recorded");
        Ok(entry)
    }

    /// Aggregate the audit trail over `period`; never writes
    pub async fn generate_security_report(&self, period: ReportPeriod) -> Result<SecurityReport> {
        if period.from >= period.to {
            return Err(RbacError::validation(
                "date_debut must be earlier than date_fin",
            ));
        }

        let state = self.state.read().await;
        let now = self.clock.now();

        let mut report = SecurityReport {
            period,
            generated_at: now,
            total_checks: 0,
            granted_checks: 0,
            denied_checks: 0,
            denial_rate: 0.0,
            top_denied_permissions: Vec::new(),
            top_denied_principals: Vec::new(),
            assignments_created: 0,
            assignments_revoked: 0,
            assignments_suspended: 0,
            assignments_reactivated: 0,
            assignments_expired: 0,
            privileged_assignments_created: 0,
            permission_changes: 0,
            role_changes: 0,
            active_assignments: 0,
        };
        let mut denied_permissions: HashMap<String, u64> = HashMap::new();
        let mut denied_principals: HashMap<String, u64> = HashMap::new();

        for entry in state
            .audit_log
            .iter()
            .filter(|e| period.contains(e.recorded_at))
        {
            match entry.action {
                AuditAction::AccessChecked => {
                    report.total_checks += 1;
                    if entry.details["autorise"].as_bool().unwrap_or(false) {
                        report.granted_checks += 1;
                    } else {
                        report.denied_checks += 1;
                        if let Some(code) = entry.details["code"].as_str() {
                            *denied_permissions.entry(code.to_string()).or_default() += 1;
                        }
                        if let Some(principal) = &entry.principal {
                            *denied_principals.entry(principal.to_string()).or_default() += 1;
                        }
                    }
                }
                AuditAction::AssignmentCreated => {
                    report.assignments_created += 1;
                    if entry.details["niveau"].as_u64().unwrap_or(0) >= PRIVILEGED_LEVEL {
                        report.privileged_assignments_created += 1;
                    }
                }
                AuditAction::AssignmentRevoked => report.assignments_revoked += 1,
                AuditAction::AssignmentSuspended => report.assignments_suspended += 1,
                AuditAction::AssignmentReactivated => report.assignments_reactivated += 1,
                AuditAction::AssignmentExpired => report.assignments_expired += 1,
                AuditAction::PermissionCreated
                | AuditAction::PermissionUpdated
                | AuditAction::PermissionDeleted => report.permission_changes += 1,
                AuditAction::RoleCreated
                | AuditAction::RoleUpdated
                | AuditAction::RoleDeleted
                | AuditAction::RolePermissionAdded
                | AuditAction::RolePermissionRemoved
                | AuditAction::RolePermissionsReplaced
                | AuditAction::RoleParentChanged => report.role_changes += 1,
            }
        }

        if report.total_checks > 0 {
            report.denial_rate = report.denied_checks as f64 / report.total_checks as f64;
        }
        report.top_denied_permissions = top(denied_permissions);
        report.top_denied_principals = top(denied_principals);
        report.active_assignments = state
            .assignments
            .values()
            .filter(|a| a.is_effective_at(now))
            .count() as u64;

        info!(
            checks = report.total_checks,
            denied = report.denied_checks,
            "Security report generated"
        );
        Ok(report)
    }
}

/// Highest counts first, ties broken by key
fn top(counts: HashMap<String, u64>) -> Vec<CountedItem> {
    let mut items: Vec<CountedItem> = counts
        .into_iter()
        .map(|(key, count)| CountedItem { key, count })
        .collect();
    items.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    items.truncate(TOP_DENIED);
    items
}

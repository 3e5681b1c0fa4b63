//! End-to-end marketplace scenarios

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::Duration as StdDuration;

    use chrono::Duration;
    use marketplace_rbac::core::models::{
        AssignmentStatus, AuditAction, AuditFilter, CreateAssignment, CreatePermission,
        CreateRole, PageRequest, ReportPeriod, ValidityWindow,
    };
    use marketplace_rbac::utils::error::RbacError;
    use marketplace_rbac::{AccessControl, ExpirySweeper};
    use uuid::Uuid;

    use crate::common::{ADMIN, AccessResultAssertions, TestMarketplace, principal};
    use crate::{assert_err, assert_ok};

    /// Scenario A: a mandatory permission cannot simply be dropped from a role
    #[tokio::test]
    async fn test_mandatory_permission_removal_conflicts() {
        let market = TestMarketplace::new();
        let delete = market
            .create_permission(CreatePermission::new("products.delete", "Delete products").mandatory())
            .await;
        let read = market.permission("products.read").await;
        let vendeur = market.role("vendeur", &[&delete, &read]).await;

        let err = assert_err!(
            market
                .rbac
                .remove_permission(vendeur.uuid, delete.uuid, None, None, ADMIN)
                .await
        );
        assert!(matches!(err, RbacError::Conflict(_)));

        let role = assert_ok!(market.rbac.get_role(vendeur.uuid).await);
        assert!(role.permissions.contains(&delete.uuid));
        assert_eq!(role.version, vendeur.version);

        // Non-mandatory permissions come off freely
        let trimmed = assert_ok!(
            market
                .rbac
                .remove_permission(vendeur.uuid, read.uuid, None, Some(vendeur.version), ADMIN)
                .await
        );
        assert_eq!(trimmed.permissions, BTreeSet::from([delete.uuid]));
    }

    /// Scenario B: a child role sees its parent's permissions plus its own
    #[tokio::test]
    async fn test_sub_admin_inherits_admin_permissions() {
        let market = TestMarketplace::new();
        let users = market.permission("users.manage").await;
        let settings = market.permission("settings.manage").await;
        let reports = market.permission("reports.view").await;

        let admin = market
            .create_role(
                CreateRole::new("admin", "Admin")
                    .level(5)
                    .permissions([users.uuid, settings.uuid]),
            )
            .await;
        let sub_admin = market
            .create_role(
                CreateRole::new("sub_admin", "SubAdmin")
                    .level(4)
                    .parent(admin.uuid)
                    .permissions([reports.uuid]),
            )
            .await;

        let effective = assert_ok!(market.rbac.resolve_effective_permission_ids(sub_admin.uuid).await);
        assert_eq!(effective, BTreeSet::from([users.uuid, settings.uuid, reports.uuid]));

        let admin_only = assert_ok!(market.rbac.resolve_effective_permission_ids(admin.uuid).await);
        assert_eq!(admin_only, BTreeSet::from([users.uuid, settings.uuid]));

        let who = principal("agent");
        market.assign(&who, &sub_admin, 7).await;
        assert_ok!(market.rbac.check(&who, "users.manage", None).await).assert_granted_by("sub_admin");
    }

    /// Scenario C: access follows the validity window and the sweep
    #[tokio::test]
    async fn test_access_ends_with_the_window() {
        let market = TestMarketplace::new();
        let perm = market.permission("orders.ship").await;
        let role = market.role("shipper", &[&perm]).await;
        let who = principal("vendeur");

        let assignment = market.assign(&who, &role, 1).await;
        assert_ok!(market.rbac.check(&who, "orders.ship", None).await).assert_granted_by("shipper");

        market.advance(Duration::days(1) + Duration::seconds(1));
        // Past date_fin the window alone already denies
        assert_ok!(market.rbac.check(&who, "orders.ship", None).await)
            .assert_denied_mentioning("orders.ship");

        let sweeper = ExpirySweeper::spawn(market.rbac.clone(), StdDuration::from_millis(10));
        let mut status = AssignmentStatus::Active;
        for _ in 0..100 {
            status = assert_ok!(market.rbac.get_assignment(assignment.uuid).await).status;
            if status == AssignmentStatus::Expired {
                break;
            }
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }
        sweeper.shutdown().await;

        assert_eq!(status, AssignmentStatus::Expired);
        assert!(!assert_ok!(market.rbac.check(&who, "orders.ship", None).await).granted);
    }

    /// Scenario D: concurrent overlapping assigns, exactly one wins
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_overlapping_assigns() {
        let market = TestMarketplace::new();
        let perm = market.permission("payouts.approve").await;
        let role = market.role("treasurer", &[&perm]).await;
        let who = principal("agent");

        let first = CreateAssignment::new(who.clone(), role.uuid, market.window(10), ADMIN);
        let second = CreateAssignment::new(who.clone(), role.uuid, market.window(3), ADMIN);

        let rbac_a = market.rbac.clone();
        let rbac_b = market.rbac.clone();
        let (a, b) = tokio::join!(
            tokio::spawn(async move { rbac_a.assign(first).await }),
            tokio::spawn(async move { rbac_b.assign(second).await }),
        );
        let outcomes = [assert_ok!(a), assert_ok!(b)];

        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        let conflicts = outcomes
            .iter()
            .filter(|r| matches!(r, Err(RbacError::Conflict(_))))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(conflicts, 1);

        let held = assert_ok!(market.rbac.list_assignments_for_principal(&who).await);
        assert_eq!(held.len(), 1);
    }

    /// Non-overlapping windows for the same pair are fine
    #[tokio::test]
    async fn test_back_to_back_windows_are_accepted() {
        let market = TestMarketplace::new();
        let perm = market.permission("payouts.view").await;
        let role = market.role("auditor", &[&perm]).await;
        let who = principal("agent");

        let now = market.now();
        let window_a = ValidityWindow::new(now, Some(now + Duration::days(1)));
        let window_b = ValidityWindow::new(
            now + Duration::days(1),
            Some(now + Duration::days(2)),
        );
        assert_ok!(market.rbac.assign(CreateAssignment::new(who.clone(), role.uuid, window_a, ADMIN)).await);
        assert_ok!(market.rbac.assign(CreateAssignment::new(who.clone(), role.uuid, window_b, ADMIN)).await);
    }

    /// The full lifecycle shows up in the audit trail and the security report
    #[tokio::test]
    async fn test_lifecycle_is_audited_and_reported() {
        let market = TestMarketplace::new();
        let period_start = market.now();
        let perm = market.permission("refunds.issue").await;
        let role = market
            .create_role(CreateRole::new("support_lead", "Support lead").level(4).permissions([perm.uuid]))
            .await;
        let who = principal("agent");
        let assignment = market.assign(&who, &role, 30).await;

        let granted = assert_ok!(market.rbac.check(&who, "refunds.issue", None).await);
        assert_ok!(market.rbac.record_access_check(&who, "refunds.issue", &granted, "gateway").await);

        assert_ok!(market.rbac.suspend(assignment.uuid, "investigation", ADMIN).await);
        let denied = assert_ok!(market.rbac.check(&who, "refunds.issue", None).await);
        assert!(!denied.granted);
        assert_ok!(market.rbac.record_access_check(&who, "refunds.issue", &denied, "gateway").await);

        let reactivated = assert_ok!(market.rbac.reactivate(assignment.uuid, ADMIN).await);
        assert!(reactivated.revocation_reason.is_none());

        let suspensions = assert_ok!(
            market
                .rbac
                .get_audit_log(
                    &AuditFilter {
                        action: Some(AuditAction::AssignmentSuspended),
                        ..Default::default()
                    },
                    PageRequest::default(),
                )
                .await
        );
        assert_eq!(suspensions.total, 1);
        assert_eq!(suspensions.items[0].target_uuid, Some(assignment.uuid));

        market.advance(Duration::minutes(1));
        let report = assert_ok!(
            market
                .rbac
                .generate_security_report(ReportPeriod::new(period_start, market.now()))
                .await
        );
        assert_eq!(report.total_checks, 2);
        assert_eq!(report.granted_checks, 1);
        assert_eq!(report.denied_checks, 1);
        assert_eq!(report.assignments_created, 1);
        assert_eq!(report.assignments_suspended, 1);
        assert_eq!(report.assignments_reactivated, 1);
        assert_eq!(report.privileged_assignments_created, 1);
        assert_eq!(report.active_assignments, 1);
        assert_eq!(report.top_denied_permissions[0].key, "refunds.issue");

        let unknown = Uuid::new_v4();
        let err = assert_err!(market.rbac.get_assignment(unknown).await);
        assert!(matches!(err, RbacError::NotFound { .. }));
    }
}

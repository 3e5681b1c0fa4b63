//! Engine property tests
//!
//! Invariants that must hold for every permission, role and assignment,
//! exercised over small hand-picked families of inputs.

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Duration;
    use marketplace_rbac::AccessControl;
    use marketplace_rbac::core::models::{
        AccessContext, AssignmentStatus, CreatePermission, CreateRole, PermissionKind,
        PermissionScope, UpdatePermission,
    };
    use marketplace_rbac::utils::error::RbacError;
    use uuid::Uuid;

    use crate::common::{ADMIN, TestMarketplace, principal};
    use crate::{assert_err, assert_ok};

    // ==================== Permission registry ====================

    #[tokio::test]
    async fn test_system_permissions_reject_every_non_counter_patch() {
        let market = TestMarketplace::new();
        let other = market.permission("users.read").await;
        let system = market
            .create_permission(CreatePermission::new("users.manage", "Manage users").system())
            .await;

        let patches = vec![
            UpdatePermission { name: Some("x".into()), ..Default::default() },
            UpdatePermission { description: Some("x".into()), ..Default::default() },
            UpdatePermission { module: Some("x".into()), ..Default::default() },
            UpdatePermission { scope: Some(PermissionScope::Object), ..Default::default() },
            UpdatePermission { kind: Some(PermissionKind::Administer), ..Default::default() },
            UpdatePermission { level: Some(5), ..Default::default() },
            UpdatePermission { is_hidden: Some(true), ..Default::default() },
            UpdatePermission { is_mandatory: Some(true), ..Default::default() },
            UpdatePermission {
                dependencies: Some(BTreeSet::from([other.uuid])),
                ..Default::default()
            },
            UpdatePermission { tags: Some(vec!["t".into()]), ..Default::default() },
            UpdatePermission {
                name: Some("x".into()),
                usage_count: Some(3),
                ..Default::default()
            },
        ];

        for patch in patches {
            let err = assert_err!(market.rbac.update_permission(system.uuid, patch.clone(), ADMIN).await);
            assert!(matches!(err, RbacError::Immutable(_)), "patch {:?} gave {:?}", patch, err);
        }

        let unchanged = assert_ok!(market.rbac.get_permission(system.uuid).await);
        assert_eq!(unchanged, system);

        let counters = UpdatePermission {
            usage_count: Some(11),
            last_used_at: Some(market.now()),
            ..Default::default()
        };
        let bumped = assert_ok!(market.rbac.update_permission(system.uuid, counters, ADMIN).await);
        assert_eq!(bumped.usage_count, 11);
    }

    #[tokio::test]
    async fn test_system_permissions_cannot_be_deleted() {
        let market = TestMarketplace::new();
        let system = market
            .create_permission(CreatePermission::new("users.manage", "Manage users").system())
            .await;
        let err = assert_err!(market.rbac.delete_permission(system.uuid, ADMIN).await);
        assert!(matches!(err, RbacError::Conflict(_) | RbacError::Immutable(_)));
    }

    // ==================== Role resolution ====================

    #[tokio::test]
    async fn test_effective_permissions_ignore_insertion_order() {
        let market = TestMarketplace::new();
        let mut perms = Vec::new();
        for code in ["catalog.read", "catalog.write", "catalog.publish", "catalog.archive"] {
            perms.push(market.permission(code).await);
        }
        let ids: Vec<Uuid> = perms.iter().map(|p| p.uuid).collect();

        let forward = market
            .create_role(CreateRole::new("forward", "Forward").permissions(ids.clone()))
            .await;
        let reversed = market
            .create_role(CreateRole::new("reversed", "Reversed").permissions(ids.iter().rev().copied()))
            .await;
        let incremental = market.create_role(CreateRole::new("incremental", "Incremental")).await;
        for id in [ids[2], ids[0], ids[3], ids[1], ids[0]] {
            assert_ok!(market.rbac.add_permission(incremental.uuid, id, None, ADMIN).await);
        }

        let a = assert_ok!(market.rbac.resolve_effective_permissions(forward.uuid).await);
        let b = assert_ok!(market.rbac.resolve_effective_permissions(reversed.uuid).await);
        let c = assert_ok!(market.rbac.resolve_effective_permissions(incremental.uuid).await);
        let again = assert_ok!(market.rbac.resolve_effective_permissions(forward.uuid).await);

        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a, again);
        assert_eq!(a.len(), 4);
    }

    #[tokio::test]
    async fn test_bulk_replace_round_trips_through_resolution() {
        let market = TestMarketplace::new();
        let parent_perm = market.permission("reports.view").await;
        let parent = market.role("reporting", &[&parent_perm]).await;

        let mut own = Vec::new();
        for code in ["orders.read", "orders.ship", "orders.refund"] {
            own.push(market.permission(code).await);
        }
        let child = market
            .create_role(CreateRole::new("logistics", "Logistics").parent(parent.uuid))
            .await;

        for subset in [vec![0usize, 1], vec![2], vec![0, 1, 2], vec![]] {
            let wanted: BTreeSet<Uuid> = subset.iter().map(|i| own[*i].uuid).collect();
            let updated = assert_ok!(
                market
                    .rbac
                    .replace_permissions(child.uuid, wanted.iter().copied().collect(), None, ADMIN)
                    .await
            );
            assert_eq!(updated.permissions, wanted);

            let effective = assert_ok!(market.rbac.resolve_effective_permission_ids(child.uuid).await);
            let own_contribution: BTreeSet<Uuid> =
                effective.difference(&BTreeSet::from([parent_perm.uuid])).copied().collect();
            assert_eq!(own_contribution, wanted);
            assert!(effective.contains(&parent_perm.uuid));
        }
    }

    #[tokio::test]
    async fn test_parent_links_never_form_a_cycle() {
        let market = TestMarketplace::new();
        let a = market.create_role(CreateRole::new("a", "A")).await;
        let b = market.create_role(CreateRole::new("b", "B").parent(a.uuid)).await;
        let c = market.create_role(CreateRole::new("c", "C").parent(b.uuid)).await;

        for (child, parent) in [(a.uuid, c.uuid), (a.uuid, b.uuid), (b.uuid, b.uuid)] {
            let err = assert_err!(market.rbac.set_parent(child, Some(parent), None, ADMIN).await);
            assert!(matches!(err, RbacError::Cycle(_)), "{:?}", err);
        }

        let tree = assert_ok!(market.rbac.role_hierarchy(a.uuid).await);
        assert_eq!(tree.size(), 3);
    }

    // ==================== Assignment lifecycle ====================

    #[tokio::test]
    async fn test_second_revoke_is_an_invalid_transition() {
        let market = TestMarketplace::new();
        let perm = market.permission("shop.manage").await;
        let role = market.role("manager", &[&perm]).await;

        for user_type in ["vendeur", "agent", "admin"] {
            let who = principal(user_type);
            let assignment = market.assign(&who, &role, 30).await;
            let revoked = assert_ok!(market.rbac.revoke(assignment.uuid, "closing", ADMIN).await);
            assert_eq!(revoked.status, AssignmentStatus::Inactive);

            let err = assert_err!(market.rbac.revoke(assignment.uuid, "again", ADMIN).await);
            assert!(matches!(err, RbacError::InvalidState { .. }));
        }
    }

    #[tokio::test]
    async fn test_sweep_expires_once() {
        let market = TestMarketplace::new();
        let perm = market.permission("shop.view").await;
        let role = market.role("viewer", &[&perm]).await;

        let short = market.assign(&principal("vendeur"), &role, 1).await;
        let long = market.assign(&principal("vendeur"), &role, 10).await;
        let suspended = market.assign(&principal("vendeur"), &role, 1).await;
        assert_ok!(market.rbac.suspend(suspended.uuid, "review", ADMIN).await);

        market.advance(Duration::days(2));
        assert_eq!(assert_ok!(market.rbac.expire_assignments().await), 1);
        assert_eq!(assert_ok!(market.rbac.expire_assignments().await), 0);

        let expired = assert_ok!(market.rbac.get_assignment(short.uuid).await);
        assert_eq!(expired.status, AssignmentStatus::Expired);
        assert!(expired.expired_at.is_some());
        assert_eq!(
            assert_ok!(market.rbac.get_assignment(long.uuid).await).status,
            AssignmentStatus::Active
        );
        assert_eq!(
            assert_ok!(market.rbac.get_assignment(suspended.uuid).await).status,
            AssignmentStatus::Suspended
        );
    }

    // ==================== Access checks ====================

    #[tokio::test]
    async fn test_bulk_check_equals_individual_checks() {
        let market = TestMarketplace::new();
        let read = market.permission("stock.read").await;
        let write = market
            .create_permission(CreatePermission::new("stock.write", "Write stock").depends_on(read.uuid))
            .await;
        let scoped = market
            .create_permission(CreatePermission::new("stock.adjust", "Adjust").scope(PermissionScope::Object))
            .await;
        market.permission("stock.audit").await;
        let role = market.role("warehouse", &[&read, &write, &scoped]).await;

        let who = principal("agent");
        market.assign(&who, &role, 5).await;

        let codes: Vec<String> = ["stock.read", "stock.write", "stock.adjust", "stock.audit", "stock.unknown"]
            .iter()
            .map(|c| c.to_string())
            .collect();

        for context in [None, Some(AccessContext::new().object("sku-42"))] {
            let bulk = assert_ok!(market.rbac.check_bulk(&who, &codes, context.as_ref()).await);
            assert_eq!(bulk.len(), codes.len());
            for code in &codes {
                let single = assert_ok!(market.rbac.check(&who, code, context.as_ref()).await);
                assert_eq!(bulk[code], single, "diverged on {}", code);
            }
        }
    }
}

//! Client state container tests against a mock REST server

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use marketplace_rbac::config::ClientConfig;
    use marketplace_rbac::core::models::{
        CreatePermission, PermissionFilter, Principal, RoleFilter, TransitionRequest,
        UpdatePermission,
    };
    use marketplace_rbac::sdk::{
        AssignmentsState, Credentials, PermissionsState, RbacApiClient, RolesState,
    };
    use marketplace_rbac::utils::error::RbacError;
    use serde_json::{Value, json};
    use uuid::Uuid;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::{assert_err, assert_ok};

    fn client_for(server: &MockServer) -> Arc<RbacApiClient> {
        let config = ClientConfig {
            base_url: format!("{}/api", server.uri()),
            default_page_size: 2,
            ..ClientConfig::default()
        };
        Arc::new(RbacApiClient::new(config).unwrap())
    }

    fn permission_json(uuid: Uuid, code: &str, name: &str) -> Value {
        json!({
            "uuid": uuid,
            "code": code,
            "nom": name,
            "categorie": "catalog",
            "module": "catalog",
            "service": "catalog",
            "niveau": 1
        })
    }

    fn role_json(uuid: Uuid, code: &str, version: u64, permissions: &[Uuid]) -> Value {
        json!({
            "uuid": uuid,
            "code": code,
            "nom": code,
            "niveau": 2,
            "version": version,
            "permissions": permissions
        })
    }

    fn assignment_json(uuid: Uuid, principal: &Principal, status: &str) -> Value {
        json!({
            "uuid": uuid,
            "utilisateur_uuid": principal.user_uuid,
            "utilisateur_type": principal.user_type,
            "role_uuid": Uuid::nil(),
            "date_debut": "2026-01-01T00:00:00Z",
            "statut": status,
            "attribue_par": "admin",
            "attribue_le": "2026-01-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_permissions_paginate_and_filter() {
        let server = MockServer::start().await;
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        Mock::given(method("GET"))
            .and(path("/api/permissions"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [permission_json(a, "catalog.read", "Read"), permission_json(b, "catalog.write", "Write")],
                "total": 3
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/permissions"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [permission_json(c, "catalog.publish", "Publish")],
                "total": 3
            })))
            .mount(&server)
            .await;

        let state = PermissionsState::new(client_for(&server), Credentials::bearer("t"));
        assert_ok!(state.refresh().await);
        assert_eq!(state.items().len(), 2);
        let list = state.list_state();
        assert_eq!(list.total, 3);
        assert!(list.has_next());

        assert_ok!(state.next_page().await);
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.list_state().page, 2);
        assert!(state.get(c).is_some());
        assert!(state.get(a).is_none());

        // New filters always start back at the first page
        assert_ok!(
            state
                .set_filters(PermissionFilter {
                    module: Some("catalog".into()),
                    ..Default::default()
                })
                .await
        );
        assert_eq!(state.list_state().page, 1);
        assert_eq!(state.items().len(), 2);
    }

    #[tokio::test]
    async fn test_mutation_replaces_cached_entity() {
        let server = MockServer::start().await;
        let uuid = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/api/permissions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                permission_json(uuid, "catalog.read", "Read")
            ])))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(format!("/api/permissions/{}", uuid)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": permission_json(uuid, "catalog.read", "Read catalog")
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/permissions"))
            .respond_with(ResponseTemplate::new(201).set_body_json(permission_json(
                Uuid::new_v4(),
                "catalog.export",
                "Export",
            )))
            .mount(&server)
            .await;

        let state = PermissionsState::new(client_for(&server), Credentials::bearer("t"));
        assert_ok!(state.refresh().await);

        let patch = UpdatePermission {
            name: Some("Read catalog".into()),
            ..Default::default()
        };
        let updated = assert_ok!(state.update(uuid, &patch).await);
        assert_eq!(updated.name, "Read catalog");
        assert_eq!(state.get(uuid).unwrap().name, "Read catalog");
        assert_eq!(state.items().len(), 1);

        assert_ok!(state.create(&CreatePermission::new("catalog.export", "Export")).await);
        assert_eq!(state.items().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_cache_untouched() {
        let server = MockServer::start().await;
        let role = Uuid::new_v4();
        let perm = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/api/roles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                role_json(role, "vendeur", 3, &[perm])
            ])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("/api/roles/{}/permissions/{}", role, perm)))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "message": "Permission obligatoire"
            })))
            .mount(&server)
            .await;

        let state = RolesState::new(client_for(&server), Credentials::bearer("t"));
        assert_ok!(state.set_filters(RoleFilter::default()).await);
        let before = state.items();

        let err = assert_err!(state.remove_permission(role, perm, None).await);
        assert!(matches!(err, RbacError::Conflict(_)));
        assert_eq!(state.items(), before);
        assert_eq!(
            state.list_state().last_error.as_deref(),
            Some("Conflict: Permission obligatoire")
        );
    }

    #[tokio::test]
    async fn test_bulk_replace_sends_cached_version() {
        let server = MockServer::start().await;
        let role = Uuid::new_v4();
        let (p1, p2) = (Uuid::new_v4(), Uuid::new_v4());

        Mock::given(method("GET"))
            .and(path("/api/roles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [role_json(role, "vendeur", 7, &[p1])]
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(format!("/api/roles/{}/permissions", role)))
            .and(body_partial_json(json!({ "version": 7 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(role_json(role, "vendeur", 8, &[p2])))
            .expect(1)
            .mount(&server)
            .await;

        let state = RolesState::new(client_for(&server), Credentials::bearer("t"));
        assert_ok!(state.refresh().await);

        let updated = assert_ok!(state.replace_permissions(role, vec![p2]).await);
        assert_eq!(updated.version, 8);
        let cached = state.get(role).unwrap();
        assert_eq!(cached.version, 8);
        assert!(cached.permissions.contains(&p2));
        assert!(!cached.permissions.contains(&p1));
    }

    #[tokio::test]
    async fn test_assignment_transitions_update_cache() {
        let server = MockServer::start().await;
        let principal = Principal::new(Uuid::new_v4(), "vendeur");
        let assignment = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/api/role-assignments"))
            .and(query_param("utilisateur_type", "vendeur"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                assignment_json(assignment, &principal, "actif")
            ])))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(format!("/api/role-assignments/{}/suspend", assignment)))
            .respond_with(ResponseTemplate::new(200).set_body_json(assignment_json(
                assignment, &principal, "suspendu",
            )))
            .mount(&server)
            .await;

        let state = AssignmentsState::new(client_for(&server), Credentials::bearer("t"));
        assert_ok!(state.refresh().await);
        assert!(state.items().is_empty());

        assert_ok!(state.set_filters(Some(principal.clone())).await);
        assert_eq!(state.items().len(), 1);

        let suspended = assert_ok!(
            state
                .suspend(assignment, &TransitionRequest::new("review", "admin"))
                .await
        );
        assert_eq!(suspended.status.to_string(), "suspendu");
        assert_eq!(state.get(assignment).unwrap().status.to_string(), "suspendu");
    }

    #[tokio::test]
    async fn test_unauthenticated_refresh_records_error() {
        let server = MockServer::start().await;
        let state = PermissionsState::new(client_for(&server), Credentials::anonymous());

        let err = assert_err!(state.refresh().await);
        assert!(matches!(err, RbacError::Auth(_)));
        let list = state.list_state();
        assert!(!list.loading);
        assert!(list.last_error.is_some());
        assert!(state.items().is_empty());
    }
}

//! Role assignment endpoints

use reqwest::Method;
use uuid::Uuid;

use crate::core::models::{
    CreateAssignment, Page, PageRequest, Principal, RoleAssignment, TransitionRequest,
};
use crate::sdk::credentials::{Credentials, RequestOptions};
use crate::sdk::envelope::{normalize_entity, normalize_list};
use crate::utils::error::Result;

use super::client::RbacApiClient;

impl RbacApiClient {
    /// `POST /role-assignments`
    pub async fn assign_role(
        &self,
        credentials: &Credentials,
        input: &CreateAssignment,
        options: &RequestOptions,
    ) -> Result<RoleAssignment> {
        let builder = self
            .request(Method::POST, "role-assignments", credentials, options)?
            .json(input);
        normalize_entity(self.send_json(builder).await?)
    }

    /// `GET /role-assignments?utilisateur_uuid=&utilisateur_type=`
    pub async fn list_assignments(
        &self,
        credentials: &Credentials,
        principal: &Principal,
        page: PageRequest,
        options: &RequestOptions,
    ) -> Result<Page<RoleAssignment>> {
        let builder = self
            .request(Method::GET, "role-assignments", credentials, options)?
            .query(principal)
            .query(&[("page", page.page), ("limit", page.limit)]);
        normalize_list(self.send_json(builder).await?, page)
    }

    pub async fn revoke_assignment(
        &self,
        credentials: &Credentials,
        uuid: Uuid,
        request: &TransitionRequest,
        options: &RequestOptions,
    ) -> Result<RoleAssignment> {
        self.transition(credentials, uuid, "revoke", request, options)
            .await
    }

    pub async fn suspend_assignment(
        &self,
        credentials: &Credentials,
        uuid: Uuid,
        request: &TransitionRequest,
        options: &RequestOptions,
    ) -> Result<RoleAssignment> {
        self.transition(credentials, uuid, "suspend", request, options)
            .await
    }

    pub async fn reactivate_assignment(
        &self,
        credentials: &Credentials,
        uuid: Uuid,
        request: &TransitionRequest,
        options: &RequestOptions,
    ) -> Result<RoleAssignment> {
        self.transition(credentials, uuid, "reactivate", request, options)
            .await
    }

    async fn transition(
        &self,
        credentials: &Credentials,
        uuid: Uuid,
        action: &str,
        request: &TransitionRequest,
        options: &RequestOptions,
    ) -> Result<RoleAssignment> {
        let builder = self
            .request(
                Method::PUT,
                &format!("role-assignments/{}/{}", uuid, action),
                credentials,
                options,
            )?
            .json(request);
        normalize_entity(self.send_json(builder).await?)
    }
}

//! Role endpoints

use bytes::Bytes;
use reqwest::Method;
use uuid::Uuid;

use crate::core::models::{
    CreateRole, Page, PageRequest, Permission, ReplacePermissions, Role, RoleFilter, UpdateRole,
};
use crate::sdk::credentials::{Credentials, RequestOptions};
use crate::sdk::envelope::{normalize_entity, normalize_list};
use crate::utils::error::Result;

use super::client::RbacApiClient;

impl RbacApiClient {
    /// `GET /roles`
    pub async fn list_roles(
        &self,
        credentials: &Credentials,
        filter: &RoleFilter,
        page: PageRequest,
        options: &RequestOptions,
    ) -> Result<Page<Role>> {
        let builder = self
            .request(Method::GET, "roles", credentials, options)?
            .query(filter)
            .query(&[("page", page.page), ("limit", page.limit)]);
        normalize_list(self.send_json(builder).await?, page)
    }

    pub async fn get_role(
        &self,
        credentials: &Credentials,
        uuid: Uuid,
        options: &RequestOptions,
    ) -> Result<Role> {
        let builder = self.request(Method::GET, &format!("roles/{}", uuid), credentials, options)?;
        normalize_entity(self.send_json(builder).await?)
    }

    pub async fn create_role(
        &self,
        credentials: &Credentials,
        input: &CreateRole,
        options: &RequestOptions,
    ) -> Result<Role> {
        let builder = self
            .request(Method::POST, "roles", credentials, options)?
            .json(input);
        normalize_entity(self.send_json(builder).await?)
    }

    pub async fn update_role(
        &self,
        credentials: &Credentials,
        uuid: Uuid,
        patch: &UpdateRole,
        options: &RequestOptions,
    ) -> Result<Role> {
        let builder = self
            .request(Method::PUT, &format!("roles/{}", uuid), credentials, options)?
            .json(patch);
        normalize_entity(self.send_json(builder).await?)
    }

    pub async fn delete_role(
        &self,
        credentials: &Credentials,
        uuid: Uuid,
        options: &RequestOptions,
    ) -> Result<()> {
        let builder =
            self.request(Method::DELETE, &format!("roles/{}", uuid), credentials, options)?;
        self.send_empty(builder).await
    }

    /// `GET /roles/{uuid}/permissions`, the role's own permissions
    pub async fn get_role_permissions(
        &self,
        credentials: &Credentials,
        role: Uuid,
        options: &RequestOptions,
    ) -> Result<Vec<Permission>> {
        let builder = self.request(
            Method::GET,
            &format!("roles/{}/permissions", role),
            credentials,
            options,
        )?;
        let page: Page<Permission> =
            normalize_list(self.send_json(builder).await?, PageRequest::default())?;
        Ok(page.items)
    }

    pub async fn add_role_permission(
        &self,
        credentials: &Credentials,
        role: Uuid,
        permission: Uuid,
        options: &RequestOptions,
    ) -> Result<Role> {
        let builder = self.request(
            Method::POST,
            &format!("roles/{}/permissions/{}", role, permission),
            credentials,
            options,
        )?;
        normalize_entity(self.send_json(builder).await?)
    }

    /// `DELETE /roles/{uuid}/permissions/{perm}`; `substitute` replaces a mandatory permission
    pub async fn remove_role_permission(
        &self,
        credentials: &Credentials,
        role: Uuid,
        permission: Uuid,
        substitute: Option<Uuid>,
        options: &RequestOptions,
    ) -> Result<Role> {
        let mut builder = self.request(
            Method::DELETE,
            &format!("roles/{}/permissions/{}", role, permission),
            credentials,
            options,
        )?;
        if let Some(substitute) = substitute {
            builder = builder.query(&[("substitut", substitute)]);
        }
        normalize_entity(self.send_json(builder).await?)
    }

    /// `PUT /roles/{uuid}/permissions`, atomic bulk replacement
    pub async fn replace_role_permissions(
        &self,
        credentials: &Credentials,
        role: Uuid,
        body: &ReplacePermissions,
        options: &RequestOptions,
    ) -> Result<Role> {
        let builder = self
            .request(
                Method::PUT,
                &format!("roles/{}/permissions", role),
                credentials,
                options,
            )?
            .json(body);
        normalize_entity(self.send_json(builder).await?)
    }

    /// `GET /roles/export-pdf`
    pub async fn export_roles_pdf(
        &self,
        credentials: &Credentials,
        options: &RequestOptions,
    ) -> Result<Bytes> {
        let builder = self.request(Method::GET, "roles/export-pdf", credentials, options)?;
        self.send_bytes(builder).await
    }
}

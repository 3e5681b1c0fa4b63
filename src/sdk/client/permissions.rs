//! Permission endpoints

use bytes::Bytes;
use reqwest::Method;
use uuid::Uuid;

use crate::core::models::{
    CreatePermission, Page, PageRequest, Permission, PermissionFilter, UpdatePermission,
};
use crate::sdk::credentials::{Credentials, RequestOptions};
use crate::sdk::envelope::{normalize_entity, normalize_list};
use crate::utils::error::Result;

use super::client::RbacApiClient;

impl RbacApiClient {
    /// `GET /permissions`
    pub async fn list_permissions(
        &self,
        credentials: &Credentials,
        filter: &PermissionFilter,
        page: PageRequest,
        options: &RequestOptions,
    ) -> Result<Page<Permission>> {
        let builder = self
            .request(Method::GET, "permissions", credentials, options)?
            .query(filter)
            .query(&[("page", page.page), ("limit", page.limit)]);
        normalize_list(self.send_json(builder).await?, page)
    }

    pub async fn get_permission(
        &self,
        credentials: &Credentials,
        uuid: Uuid,
        options: &RequestOptions,
    ) -> Result<Permission> {
        let builder = self.request(
            Method::GET,
            &format!("permissions/{}", uuid),
            credentials,
            options,
        )?;
        normalize_entity(self.send_json(builder).await?)
    }

    pub async fn create_permission(
        &self,
        credentials: &Credentials,
        input: &CreatePermission,
        options: &RequestOptions,
    ) -> Result<Permission> {
        let builder = self
            .request(Method::POST, "permissions", credentials, options)?
            .json(input);
        normalize_entity(self.send_json(builder).await?)
    }

    pub async fn update_permission(
        &self,
        credentials: &Credentials,
        uuid: Uuid,
        patch: &UpdatePermission,
        options: &RequestOptions,
    ) -> Result<Permission> {
        let builder = self
            .request(
                Method::PUT,
                &format!("permissions/{}", uuid),
                credentials,
                options,
            )?
            .json(patch);
        normalize_entity(self.send_json(builder).await?)
    }

    pub async fn delete_permission(
        &self,
        credentials: &Credentials,
        uuid: Uuid,
        options: &RequestOptions,
    ) -> Result<()> {
        let builder = self.request(
            Method::DELETE,
            &format!("permissions/{}", uuid),
            credentials,
            options,
        )?;
        self.send_empty(builder).await
    }

    /// `GET /permissions/export-pdf`
    pub async fn export_permissions_pdf(
        &self,
        credentials: &Credentials,
        options: &RequestOptions,
    ) -> Result<Bytes> {
        let builder = self.request(Method::GET, "permissions/export-pdf", credentials, options)?;
        self.send_bytes(builder).await
    }
}

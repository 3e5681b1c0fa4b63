//! Access check endpoints

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;

use crate::auth::rbac::AccessControl;
use crate::core::models::{
    AccessCheckRequest, AccessCheckResult, AccessContext, BulkAccessCheckRequest, Principal,
};
use crate::sdk::credentials::{Credentials, RequestOptions};
use crate::sdk::envelope::normalize_entity;
use crate::utils::error::Result;

use super::client::RbacApiClient;

impl RbacApiClient {
    /// `POST /permissions/check-access`
    pub async fn check_access(
        &self,
        credentials: &Credentials,
        request: &AccessCheckRequest,
        options: &RequestOptions,
    ) -> Result<AccessCheckResult> {
        let builder = self
            .request(Method::POST, "permissions/check-access", credentials, options)?
            .json(request);
        normalize_entity(self.send_json(builder).await?)
    }

    /// `POST /permissions/check-multiple`
    pub async fn check_multiple(
        &self,
        credentials: &Credentials,
        request: &BulkAccessCheckRequest,
        options: &RequestOptions,
    ) -> Result<HashMap<String, AccessCheckResult>> {
        let builder = self
            .request(Method::POST, "permissions/check-multiple", credentials, options)?
            .json(request);
        normalize_entity(self.send_json(builder).await?)
    }
}

/// A client bound to one set of credentials, usable wherever an [`AccessControl`] is expected
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    client: Arc<RbacApiClient>,
    credentials: Credentials,
    options: RequestOptions,
}

impl AuthenticatedClient {
    pub fn new(client: Arc<RbacApiClient>, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
            options: RequestOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn client(&self) -> &RbacApiClient {
        &self.client
    }
}

#[async_trait]
impl AccessControl for AuthenticatedClient {
    async fn check(
        &self,
        principal: &Principal,
        permission_code: &str,
        context: Option<&AccessContext>,
    ) -> Result<AccessCheckResult> {
        let request = AccessCheckRequest {
            principal: principal.clone(),
            permission_code: permission_code.to_string(),
            context: context.cloned(),
        };
        self.client
            .check_access(&self.credentials, &request, &self.options)
            .await
    }

    async fn check_bulk(
        &self,
        principal: &Principal,
        permission_codes: &[String],
        context: Option<&AccessContext>,
    ) -> Result<HashMap<String, AccessCheckResult>> {
        let request = BulkAccessCheckRequest {
            principal: principal.clone(),
            permission_codes: permission_codes.to_vec(),
            context: context.cloned(),
        };
        self.client
            .check_multiple(&self.credentials, &request, &self.options)
            .await
    }
}

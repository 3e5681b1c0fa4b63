//! Role list view backed by the REST client

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::core::models::{CreateRole, ReplacePermissions, Role, RoleFilter, UpdateRole};
use crate::sdk::client::RbacApiClient;
use crate::sdk::credentials::{Credentials, RequestOptions};
use crate::utils::error::Result;

use super::cache::EntityCache;
use super::list::ListState;

#[derive(Debug)]
pub struct RolesState {
    client: Arc<RbacApiClient>,
    credentials: Credentials,
    options: RequestOptions,
    list: Mutex<ListState<RoleFilter>>,
    cache: EntityCache<Role>,
}

impl RolesState {
    pub fn new(client: Arc<RbacApiClient>, credentials: Credentials) -> Self {
        let limit = client.config().default_page_size;
        Self {
            client,
            credentials,
            options: RequestOptions::default(),
            list: Mutex::new(ListState::new(limit)),
            cache: EntityCache::new(),
        }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn items(&self) -> Vec<Role> {
        self.cache.items()
    }

    pub fn get(&self, uuid: Uuid) -> Option<Role> {
        self.cache.get(uuid)
    }

    pub fn list_state(&self) -> ListState<RoleFilter> {
        self.list.lock().clone()
    }

    pub async fn refresh(&self) -> Result<()> {
        let (filters, page) = self.list.lock().begin();
        debug!(page = page.page, limit = page.limit, "Refreshing roles");
        let result = self
            .client
            .list_roles(&self.credentials, &filters, page, &self.options)
            .await;
        let items = self.list.lock().finish(result)?;
        self.cache.replace_all(items);
        Ok(())
    }

    pub async fn goto_page(&self, page: u64) -> Result<()> {
        self.list.lock().page = page.max(1);
        self.refresh().await
    }

    pub async fn next_page(&self) -> Result<()> {
        let next = self.list.lock().page + 1;
        self.goto_page(next).await
    }

    pub async fn set_filters(&self, filters: RoleFilter) -> Result<()> {
        {
            let mut list = self.list.lock();
            list.filters = filters;
            list.page = 1;
        }
        self.refresh().await
    }

    pub async fn create(&self, input: &CreateRole) -> Result<Role> {
        let result = self
            .client
            .create_role(&self.credentials, input, &self.options)
            .await;
        self.commit(result)
    }

    pub async fn update(&self, uuid: Uuid, patch: &UpdateRole) -> Result<Role> {
        let result = self
            .client
            .update_role(&self.credentials, uuid, patch, &self.options)
            .await;
        self.commit(result)
    }

    pub async fn delete(&self, uuid: Uuid) -> Result<()> {
        let result = self
            .client
            .delete_role(&self.credentials, uuid, &self.options)
            .await;
        self.list.lock().track(result)?;
        self.cache.remove(uuid);
        Ok(())
    }

    pub async fn add_permission(&self, role: Uuid, permission: Uuid) -> Result<Role> {
        let result = self
            .client
            .add_role_permission(&self.credentials, role, permission, &self.options)
            .await;
        self.commit(result)
    }

    pub async fn remove_permission(
        &self,
        role: Uuid,
        permission: Uuid,
        substitute: Option<Uuid>,
    ) -> Result<Role> {
        let result = self
            .client
            .remove_role_permission(&self.credentials, role, permission, substitute, &self.options)
            .await;
        self.commit(result)
    }

    /// Bulk replace guarded by the cached role version, when one is cached
    pub async fn replace_permissions(&self, role: Uuid, permissions: Vec<Uuid>) -> Result<Role> {
        let body = ReplacePermissions {
            permissions,
            version: self.cache.get(role).map(|r| r.version),
        };
        let result = self
            .client
            .replace_role_permissions(&self.credentials, role, &body, &self.options)
            .await;
        self.commit(result)
    }

    fn commit(&self, result: Result<Role>) -> Result<Role> {
        let role = self.list.lock().track(result)?;
        self.cache.replace(role.clone());
        Ok(role)
    }
}

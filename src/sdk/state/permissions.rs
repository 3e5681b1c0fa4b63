//! Permission list view backed by the REST client

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::core::models::{CreatePermission, Permission, PermissionFilter, UpdatePermission};
use crate::sdk::client::RbacApiClient;
use crate::sdk::credentials::{Credentials, RequestOptions};
use crate::utils::error::Result;

use super::cache::EntityCache;
use super::list::ListState;

#[derive(Debug)]
pub struct PermissionsState {
    client: Arc<RbacApiClient>,
    credentials: Credentials,
    options: RequestOptions,
    list: Mutex<ListState<PermissionFilter>>,
    cache: EntityCache<Permission>,
}

impl PermissionsState {
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

    pub fn items(&self) -> Vec<Permission> {
        self.cache.items()
    }

    pub fn get(&self, uuid: Uuid) -> Option<Permission> {
        self.cache.get(uuid)
    }

    pub fn list_state(&self) -> ListState<PermissionFilter> {
        self.list.lock().clone()
    }

    /// Re-fetch the current page with the current filters
    pub async fn refresh(&self) -> Result<()> {
        let (filters, page) = self.list.lock().begin();
        debug!(page = page.page, limit = page.limit, "Refreshing permissions");
        let result = self
            .client
            .list_permissions(&self.credentials, &filters, page, &self.options)
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

    /// Replace the filters and go back to the first page
    pub async fn set_filters(&self, filters: PermissionFilter) -> Result<()> {
        {
            let mut list = self.list.lock();
            list.filters = filters;
            list.page = 1;
        }
        self.refresh().await
    }

    pub async fn create(&self, input: &CreatePermission) -> Result<Permission> {
        let result = self
            .client
            .create_permission(&self.credentials, input, &self.options)
            .await;
        let created = self.list.lock().track(result)?;
        self.cache.replace(created.clone());
        Ok(created)
    }

    pub async fn update(&self, uuid: Uuid, patch: &UpdatePermission) -> Result<Permission> {
        let result = self
            .client
            .update_permission(&self.credentials, uuid, patch, &self.options)
            .await;
        let updated = self.list.lock().track(result)?;
        self.cache.replace(updated.clone());
        Ok(updated)
    }

    pub async fn delete(&self, uuid: Uuid) -> Result<()> {
        let result = self
            .client
            .delete_permission(&self.credentials, uuid, &self.options)
            .await;
        self.list.lock().track(result)?;
        self.cache.remove(uuid);
        Ok(())
    }
}

//! Assignments of one principal, backed by the REST client

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::core::models::{CreateAssignment, Principal, RoleAssignment, TransitionRequest};
use crate::sdk::client::RbacApiClient;
use crate::sdk::credentials::{Credentials, RequestOptions};
use crate::utils::error::Result;

use super::cache::EntityCache;
use super::list::ListState;

/// The list filter is the principal whose assignments are shown
#[derive(Debug)]
pub struct AssignmentsState {
    client: Arc<RbacApiClient>,
    credentials: Credentials,
    options: RequestOptions,
    list: Mutex<ListState<Option<Principal>>>,
    cache: EntityCache<RoleAssignment>,
}

impl AssignmentsState {
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

    pub fn items(&self) -> Vec<RoleAssignment> {
        self.cache.items()
    }

    pub fn get(&self, uuid: Uuid) -> Option<RoleAssignment> {
        self.cache.get(uuid)
    }

    pub fn list_state(&self) -> ListState<Option<Principal>> {
        self.list.lock().clone()
    }

    /// Re-fetch the current page; without a selected principal the cache is emptied
    pub async fn refresh(&self) -> Result<()> {
        let (principal, page) = self.list.lock().begin();
        let Some(principal) = principal else {
            let mut list = self.list.lock();
            list.loading = false;
            list.total = 0;
            self.cache.clear();
            return Ok(());
        };

        debug!(principal = %principal, page = page.page, "Refreshing assignments");
        let result = self
            .client
            .list_assignments(&self.credentials, &principal, page, &self.options)
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

    pub async fn set_filters(&self, principal: Option<Principal>) -> Result<()> {
        {
            let mut list = self.list.lock();
            list.filters = principal;
            list.page = 1;
        }
        self.refresh().await
    }

    pub async fn assign(&self, input: &CreateAssignment) -> Result<RoleAssignment> {
        let result = self
            .client
            .assign_role(&self.credentials, input, &self.options)
            .await;
        self.commit(result)
    }

    pub async fn revoke(&self, uuid: Uuid, request: &TransitionRequest) -> Result<RoleAssignment> {
        let result = self
            .client
            .revoke_assignment(&self.credentials, uuid, request, &self.options)
            .await;
        self.commit(result)
    }

    pub async fn suspend(&self, uuid: Uuid, request: &TransitionRequest) -> Result<RoleAssignment> {
        let result = self
            .client
            .suspend_assignment(&self.credentials, uuid, request, &self.options)
            .await;
        self.commit(result)
    }

    pub async fn reactivate(
        &self,
        uuid: Uuid,
        request: &TransitionRequest,
    ) -> Result<RoleAssignment> {
        let result = self
            .client
            .reactivate_assignment(&self.credentials, uuid, request, &self.options)
            .await;
        self.commit(result)
    }

    fn commit(&self, result: Result<RoleAssignment>) -> Result<RoleAssignment> {
        let assignment = self.list.lock().track(result)?;
        self.cache.replace(assignment.clone());
        Ok(assignment)
    }
}

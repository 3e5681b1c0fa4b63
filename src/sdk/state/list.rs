//! Filters, pagination and request status of a list view

use crate::core::models::{Page, PageRequest};
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<F> {
    pub filters: F,
    pub page: u64,
    pub limit: u64,
    /// Size of the whole listing as last reported by the server
    pub total: u64,
    pub loading: bool,
    pub last_error: Option<String>,
}

impl<F: Default> ListState<F> {
    pub fn new(limit: u64) -> Self {
        Self {
            filters: F::default(),
            page: 1,
            limit: limit.max(1),
            total: 0,
            loading: false,
            last_error: None,
        }
    }
}

impl<F: Clone> ListState<F> {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }

    /// Mark a fetch as started and snapshot what it should ask for
    pub(crate) fn begin(&mut self) -> (F, PageRequest) {
        self.loading = true;
        (self.filters.clone(), self.page_request())
    }

    /// Record a finished fetch; on success hand back the items to cache
    pub(crate) fn finish<T>(&mut self, result: Result<Page<T>>) -> Result<Vec<T>> {
        self.loading = false;
        match result {
            Ok(page) => {
                self.total = page.total;
                self.page = page.page.max(1);
                self.last_error = None;
                Ok(page.items)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Record the outcome of a mutation
    pub(crate) fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(e) => self.last_error = Some(e.to_string()),
        }
        result
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.limit.max(1))
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::RbacError;

    #[test]
    fn test_finish_records_total_and_clears_error() {
        let mut list: ListState<()> = ListState::new(10);
        list.last_error = Some("previous".to_string());
        let (_, request) = list.begin();
        assert!(list.loading);
        assert_eq!(request, PageRequest::new(1, 10));

        let items = list
            .finish(Ok(Page::paginate((0..25).collect::<Vec<_>>(), request)))
            .unwrap();
        assert_eq!(items.len(), 10);
        assert_eq!(list.total, 25);
        assert_eq!(list.total_pages(), 3);
        assert!(list.has_next());
        assert!(!list.loading);
        assert!(list.last_error.is_none());
    }

    #[test]
    fn test_finish_keeps_error_message() {
        let mut list: ListState<()> = ListState::new(0);
        assert_eq!(list.limit, 1);
        list.begin();
        let err = list
            .finish::<u8>(Err(RbacError::Conflict("busy".to_string())))
            .unwrap_err();
        assert!(matches!(err, RbacError::Conflict(_)));
        assert_eq!(list.last_error.as_deref(), Some("Conflict: busy"));
        assert!(!list.loading);
    }
}

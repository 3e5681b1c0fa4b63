//! Audit and reporting endpoints

use reqwest::Method;

use crate::core::models::{AuditEntry, AuditFilter, Page, PageRequest, ReportPeriod, SecurityReport};
use crate::sdk::credentials::{Credentials, RequestOptions};
use crate::sdk::envelope::{normalize_entity, normalize_list};
use crate::utils::error::Result;

use super::client::RbacApiClient;

impl RbacApiClient {
    /// `GET /permissions/audit`
    pub async fn get_audit_log(
        &self,
        credentials: &Credentials,
        filter: &AuditFilter,
        page: PageRequest,
        options: &RequestOptions,
    ) -> Result<Page<AuditEntry>> {
        let builder = self
            .request(Method::GET, "permissions/audit", credentials, options)?
            .query(filter)
            .query(&[("page", page.page), ("limit", page.limit)]);
        normalize_list(self.send_json(builder).await?, page)
    }

    /// `POST /permissions/security-report`
    pub async fn security_report(
        &self,
        credentials: &Credentials,
        period: &ReportPeriod,
        options: &RequestOptions,
    ) -> Result<SecurityReport> {
        let builder = self
            .request(Method::POST, "permissions/security-report", credentials, options)?
            .json(period);
        normalize_entity(self.send_json(builder).await?)
    }
}

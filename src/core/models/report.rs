//! Security report model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reporting period `[date_debut, date_fin)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    #[serde(rename = "date_debut")]
    pub from: DateTime<Utc>,
    #[serde(rename = "date_fin")]
    pub to: DateTime<Utc>,
}

impl ReportPeriod {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at < self.to
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountedItem {
    #[serde(rename = "cle")]
    pub key: String,
    #[serde(rename = "nombre")]
    pub count: u64,
}

/// Read-only aggregation over access checks and assignment lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityReport {
    #[serde(rename = "periode")]
    pub period: ReportPeriod,
    #[serde(rename = "genere_le")]
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "verifications_total")]
    pub total_checks: u64,
    #[serde(rename = "verifications_autorisees")]
    pub granted_checks: u64,
    #[serde(rename = "verifications_refusees")]
    pub denied_checks: u64,
    #[serde(rename = "taux_refus")]
    pub denial_rate: f64,
    #[serde(rename = "permissions_les_plus_refusees", default)]
    pub top_denied_permissions: Vec<CountedItem>,
    #[serde(rename = "principaux_les_plus_refuses", default)]
    pub top_denied_principals: Vec<CountedItem>,
    #[serde(rename = "attributions_creees")]
    pub assignments_created: u64,
    #[serde(rename = "attributions_revoquees")]
    pub assignments_revoked: u64,
    #[serde(rename = "attributions_suspendues")]
    pub assignments_suspended: u64,
    #[serde(rename = "attributions_reactivees")]
    pub assignments_reactivated: u64,
    #[serde(rename = "attributions_expirees")]
    pub assignments_expired: u64,
    /// Assignments of roles with `niveau >= 4`
    #[serde(rename = "attributions_privilegiees")]
    pub privileged_assignments_created: u64,
    #[serde(rename = "modifications_permissions")]
    pub permission_changes: u64,
    #[serde(rename = "modifications_roles")]
    pub role_changes: u64,
    /// Assignments in `actif` state when the report was generated
    #[serde(rename = "attributions_actives")]
    pub active_assignments: u64,
}

//! RoleAssignment domain model and its lifecycle states

use super::common::{Identified, Principal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle state of an assignment.
///
/// `actif` ⇄ `suspendu`, `actif` → `expire` (sweep only), `actif`/`suspendu` → `inactif`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AssignmentStatus {
    #[default]
    #[serde(rename = "actif")]
    Active,
    #[serde(rename = "inactif")]
    Inactive,
    #[serde(rename = "suspendu")]
    Suspended,
    #[serde(rename = "expire")]
    Expired,
}

impl AssignmentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, AssignmentStatus::Inactive | AssignmentStatus::Expired)
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssignmentStatus::Active => "actif",
            AssignmentStatus::Inactive => "inactif",
            AssignmentStatus::Suspended => "suspendu",
            AssignmentStatus::Expired => "expire",
        };
        f.write_str(s)
    }
}

/// Half-open validity window `[date_debut, date_fin)`; no end means open-ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    #[serde(rename = "date_debut")]
    pub starts_at: DateTime<Utc>,
    #[serde(rename = "date_fin", default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
}

impl ValidityWindow {
    pub fn new(starts_at: DateTime<Utc>, ends_at: Option<DateTime<Utc>>) -> Self {
        Self { starts_at, ends_at }
    }

    pub fn open_ended(starts_at: DateTime<Utc>) -> Self {
        Self::new(starts_at, None)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.starts_at <= at && self.ends_at.is_none_or(|end| at < end)
    }

    pub fn overlaps(&self, other: &ValidityWindow) -> bool {
        let self_starts_before_other_ends = other.ends_at.is_none_or(|end| self.starts_at < end);
        let other_starts_before_self_ends = self.ends_at.is_none_or(|end| other.starts_at < end);
        self_starts_before_other_ends && other_starts_before_self_ends
    }

    pub fn has_ended(&self, at: DateTime<Utc>) -> bool {
        self.ends_at.is_some_and(|end| at >= end)
    }
}

/// Time-bounded grant of one role to one principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub uuid: Uuid,
    #[serde(flatten)]
    pub principal: Principal,
    pub role_uuid: Uuid,
    #[serde(flatten)]
    pub window: ValidityWindow,
    /// Cached state; authoritative validity also requires the window to contain `now`
    #[serde(rename = "statut")]
    pub status: AssignmentStatus,
    #[serde(rename = "attribue_par")]
    pub assigned_by: String,
    #[serde(rename = "attribue_le")]
    pub assigned_at: DateTime<Utc>,
    #[serde(rename = "motif_attribution", default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Set on suspension or revocation, cleared on reactivation
    #[serde(rename = "revoque_par", default, skip_serializing_if = "Option::is_none")]
    pub revoked_by: Option<String>,
    #[serde(rename = "revoque_le", default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
    #[serde(rename = "motif_revocation", default, skip_serializing_if = "Option::is_none")]
    pub revocation_reason: Option<String>,
    #[serde(rename = "expire_le", default, skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl RoleAssignment {
    /// `statut = actif` and `date_debut ≤ at < date_fin`
    pub fn is_effective_at(&self, at: DateTime<Utc>) -> bool {
        self.status == AssignmentStatus::Active && self.window.contains(at)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl Identified for RoleAssignment {
    fn uuid(&self) -> Uuid {
        self.uuid
    }
}

/// Assignment creation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAssignment {
    #[serde(flatten)]
    pub principal: Principal,
    pub role_uuid: Uuid,
    #[serde(flatten)]
    pub window: ValidityWindow,
    #[serde(rename = "attribue_par")]
    pub assigned_by: String,
    #[serde(rename = "motif_attribution", default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CreateAssignment {
    pub fn new(
        principal: Principal,
        role_uuid: Uuid,
        window: ValidityWindow,
        assigned_by: impl Into<String>,
    ) -> Self {
        Self {
            principal,
            role_uuid,
            window,
            assigned_by: assigned_by.into(),
            reason: None,
        }
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Body of suspend/revoke transitions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionRequest {
    #[serde(rename = "motif", default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(rename = "acteur", default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

impl TransitionRequest {
    pub fn new(reason: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            actor: Some(actor.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_window_is_half_open() {
        let start = Utc::now();
        let w = ValidityWindow::new(start, Some(start + Duration::hours(1)));
        assert!(w.contains(start));
        assert!(!w.contains(start + Duration::hours(1)));
        assert!(!w.contains(start - Duration::seconds(1)));
        assert!(w.has_ended(start + Duration::hours(1)));
    }

    #[test]
    fn test_window_overlap() {
        let t0 = Utc::now();
        let a = ValidityWindow::new(t0, Some(t0 + Duration::days(1)));
        let adjacent = ValidityWindow::new(t0 + Duration::days(1), Some(t0 + Duration::days(2)));
        let inside = ValidityWindow::new(t0 + Duration::hours(2), Some(t0 + Duration::hours(3)));
        let open = ValidityWindow::open_ended(t0 - Duration::days(10));
        assert!(!a.overlaps(&adjacent));
        assert!(a.overlaps(&inside));
        assert!(open.overlaps(&a));
        assert!(adjacent.overlaps(&open));
    }

    #[test]
    fn test_terminal_states() {
        assert!(AssignmentStatus::Inactive.is_terminal());
        assert!(AssignmentStatus::Expired.is_terminal());
        assert!(!AssignmentStatus::Active.is_terminal());
        assert!(!AssignmentStatus::Suspended.is_terminal());
        assert_eq!(AssignmentStatus::Suspended.to_string(), "suspendu");
    }

    #[test]
    fn test_assignment_wire_shape_is_flat() {
        let now = Utc::now();
        let a = RoleAssignment {
            uuid: Uuid::new_v4(),
            principal: Principal::new(Uuid::new_v4(), "vendeur"),
            role_uuid: Uuid::new_v4(),
            window: ValidityWindow::open_ended(now),
            status: AssignmentStatus::Active,
            assigned_by: "admin".into(),
            assigned_at: now,
            reason: None,
            revoked_by: None,
            revoked_at: None,
            revocation_reason: None,
            expired_at: None,
            updated_at: now,
        };
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["statut"], "actif");
        assert_eq!(json["utilisateur_type"], "vendeur");
        assert!(json.get("date_debut").is_some());
        let back: RoleAssignment = serde_json::from_value(json).unwrap();
        assert_eq!(back, a);
    }
}

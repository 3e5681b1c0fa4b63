//! Test fixtures and data factories
//!
//! All fixtures drive the real engine; nothing here is mocked.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use marketplace_rbac::auth::rbac::{ManualClock, RbacSystem};
use marketplace_rbac::config::EngineConfig;
use marketplace_rbac::core::models::{
    CreateAssignment, CreatePermission, CreateRole, Permission, Principal, Role, RoleAssignment,
    ValidityWindow,
};

pub const ADMIN: &str = "admin@marketplace";

/// A fresh engine whose clock only moves when the test says so
pub struct TestMarketplace {
    pub rbac: RbacSystem,
    pub clock: Arc<ManualClock>,
}

impl TestMarketplace {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let clock = Arc::new(ManualClock::new(Self::epoch()));
        let rbac = RbacSystem::with_clock(config, clock.clone());
        Self { rbac, clock }
    }

    /// Initial clock reading
    pub fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.rbac.now()
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    pub async fn permission(&self, code: &str) -> Permission {
        self.create_permission(CreatePermission::new(code, code)).await
    }

    pub async fn create_permission(&self, input: CreatePermission) -> Permission {
        self.rbac.create_permission(input, ADMIN).await.unwrap()
    }

    pub async fn role(&self, code: &str, permissions: &[&Permission]) -> Role {
        self.create_role(CreateRole::new(code, code).permissions(permissions.iter().map(|p| p.uuid)))
            .await
    }

    pub async fn create_role(&self, input: CreateRole) -> Role {
        self.rbac.create_role(input, ADMIN).await.unwrap()
    }

    /// Window starting now and lasting `days`
    pub fn window(&self, days: i64) -> ValidityWindow {
        let now = self.now();
        ValidityWindow::new(now, Some(now + Duration::days(days)))
    }

    pub async fn assign(&self, who: &Principal, role: &Role, days: i64) -> RoleAssignment {
        self.rbac
            .assign(CreateAssignment::new(who.clone(), role.uuid, self.window(days), ADMIN))
            .await
            .unwrap()
    }
}

impl Default for TestMarketplace {
    fn default() -> Self {
        Self::new()
    }
}

pub fn principal(user_type: &str) -> Principal {
    Principal::new(Uuid::new_v4(), user_type)
}

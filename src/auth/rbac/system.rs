//! RBAC system core functionality

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::config::EngineConfig;
use crate::core::models::{AssignmentStatus, PageRequest};

use super::clock::{Clock, SystemClock};
use super::state::RbacState;

/// Authoritative in-process RBAC engine
///
/// Cloning is cheap and every clone shares the same state, so a clone can be
/// handed to the expiry sweeper or to concurrent request handlers.
#[derive(Debug, Clone)]
pub struct RbacSystem {
    pub(super) config: EngineConfig,
    pub(super) state: Arc<RwLock<RbacState>>,
    pub(super) clock: Arc<dyn Clock>,
}

/// Entity counts for dashboards and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RbacStats {
    pub permissions: usize,
    pub roles: usize,
    pub active_assignments: usize,
    pub suspended_assignments: usize,
    pub audit_entries: usize,
}

impl RbacSystem {
    /// Create an empty engine driven by the wall clock
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        info!(
            max_hierarchy_depth = config.max_hierarchy_depth,
            "Initializing RBAC system"
        );
        Self {
            config,
            state: Arc::new(RwLock::new(RbacState::default())),
            clock,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Clamp a caller page request to the configured bounds
    pub(super) fn page_request(&self, request: PageRequest) -> PageRequest {
        request.clamped(self.config.max_page_size)
    }

    pub async fn stats(&self) -> RbacStats {
        let state = self.state.read().await;
        let count = |status: AssignmentStatus| {
            state
                .assignments
                .values()
                .filter(|a| a.status == status)
                .count()
        };
        RbacStats {
            permissions: state.permissions.len(),
            roles: state.live_roles().count(),
            active_assignments: count(AssignmentStatus::Active),
            suspended_assignments: count(AssignmentStatus::Suspended),
            audit_entries: state.audit_log.len(),
        }
    }
}

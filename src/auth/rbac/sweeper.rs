//! Periodic expiry of ended assignments

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::system::RbacSystem;

/// Background task running [`RbacSystem::expire_assignments`] on an interval
#[derive(Debug)]
pub struct ExpirySweeper;

/// Handle to a running sweeper; dropping it leaves the task running
#[derive(Debug)]
pub struct SweeperHandle {
    task: JoinHandle<()>,
}

impl ExpirySweeper {
    /// Spawn the sweep loop on the current tokio runtime
    pub fn spawn(system: RbacSystem, interval: Duration) -> SweeperHandle {
        info!(interval_secs = interval.as_secs(), "Starting assignment expiry sweeper");
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = system.expire_assignments().await {
                    warn!("Assignment expiry sweep failed: {}", e);
                }
            }
        });
        SweeperHandle { task }
    }

    /// Spawn with the interval from the engine configuration
    pub fn spawn_configured(system: RbacSystem) -> SweeperHandle {
        let interval = system.config().sweep_interval();
        Self::spawn(system, interval)
    }
}

impl SweeperHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the sweep loop and wait for the task to wind down
    pub async fn shutdown(self) {
        self.task.abort();
        let _ = self.task.await;
        info!("Assignment expiry sweeper stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn test_shutdown_stops_the_loop() {
        tokio_test::block_on(async {
            let system = RbacSystem::new(EngineConfig::default());
            let handle = ExpirySweeper::spawn(system, Duration::from_millis(5));
            assert!(handle.is_running());
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.shutdown().await;
        });
    }
}

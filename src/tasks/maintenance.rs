//! Maintenance Tasks
//!
//! Background timers over the cache registry: the expiration sweep and the
//! log/alert decay pass.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::registry::CacheRegistry;

/// Spawns a task that sweeps expired entries from every cache each
/// `interval_secs` seconds.
///
/// Returns a JoinHandle that can be aborted during shutdown.
pub fn spawn_sweep_task(registry: CacheRegistry, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiration sweep with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = registry.sweep_all().await;
            if removed > 0 {
                info!("Expiration sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiration sweep: no expired entries found");
            }
        }
    })
}

/// Spawns a task that purges aged log records and alerts from every cache
/// each `interval_secs` seconds.
pub fn spawn_decay_task(registry: CacheRegistry, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!("Starting decay pass with interval of {} seconds", interval_secs);

        loop {
            tokio::time::sleep(interval).await;

            let removed = registry.decay_all().await;
            debug!("Decay pass: purged {} log records and alerts", removed);
        }
    })
}

/// Handles to the running maintenance timers.
#[derive(Debug)]
pub struct MaintenanceHandles {
    sweep: JoinHandle<()>,
    decay: JoinHandle<()>,
}

impl MaintenanceHandles {
    /// Stops both timers. Caches stay usable afterwards.
    pub fn dispose(self) {
        self.sweep.abort();
        self.decay.abort();
        info!("Maintenance tasks stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.sweep.is_finished() && self.decay.is_finished()
    }
}

/// Starts the sweep and decay timers over `registry`.
pub fn spawn_maintenance(
    registry: &CacheRegistry,
    sweep_interval_secs: u64,
    decay_interval_secs: u64,
) -> MaintenanceHandles {
    MaintenanceHandles {
        sweep: spawn_sweep_task(registry.clone(), sweep_interval_secs),
        decay: spawn_decay_task(registry.clone(), decay_interval_secs),
    }
}

//! Periodic background sync.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info};

use crate::settings::SettingsService;

/// Background task re-running apply passes at a fixed interval.
pub struct SyncScheduler {
    settings: Arc<SettingsService>,
    refresh_interval: Duration,
}

impl SyncScheduler {
    /// Create a scheduler. `interval_secs` must be positive.
    pub fn new(settings: Arc<SettingsService>, interval_secs: u64) -> Self {
        Self {
            settings,
            refresh_interval: Duration::from_secs(interval_secs.max(1)),
        }
    }

    /// The configured interval.
    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Run the scheduler loop. The first pass runs immediately.
    pub async fn run(&self) {
        info!(
            "Sync scheduler started (interval: {} seconds)",
            self.refresh_interval.as_secs()
        );

        let mut timer = interval(self.refresh_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            timer.tick().await;
            self.tick().await;
        }
    }

    async fn tick(&self) {
        match self.settings.run_sync().await {
            Ok(report) => info!("Scheduled sync finished: {}", report.summary()),
            Err(e) => error!("Scheduled sync failed: {}", e),
        }
    }

    /// Spawn the scheduler on the runtime.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }
}

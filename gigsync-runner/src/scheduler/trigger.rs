//! Sync trigger
//!
//! Runs one pass immediately on start, then one per interval in `interval`
//! mode. A pass still in flight when the next one is due is skipped by
//! [`SyncService::run_all`].

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use crate::config::RunMode;
use crate::service::{ReaperService, RunReport, SyncService};
use crate::source::SourceAdapter;

pub struct SyncScheduler {
    mode: RunMode,
    interval: Duration,
    sources: Vec<Arc<dyn SourceAdapter>>,
    sync: Arc<SyncService>,
    reaper: Arc<ReaperService>,
}

impl SyncScheduler {
    pub fn new(
        mode: RunMode,
        interval: Duration,
        sources: Vec<Arc<dyn SourceAdapter>>,
        sync: Arc<SyncService>,
        reaper: Arc<ReaperService>,
    ) -> Self {
        Self {
            mode,
            interval,
            sources,
            sync,
            reaper,
        }
    }

    /// Runs until the process is stopped, or returns after one pass in
    /// `once` mode
    pub async fn run(&self) -> Result<()> {
        match self.mode {
            RunMode::Once => {
                info!("Running a single sync pass");
                self.tick().await;
                Ok(())
            }
            RunMode::Interval => {
                info!("Scheduling sync every {:?}", self.interval);

                let mut interval = time::interval(self.interval);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    interval.tick().await;
                    self.tick().await;
                }
            }
        }
    }

    /// One full pass: sync, sweep, stats
    pub async fn tick(&self) -> Option<RunReport> {
        let report = self.sync.run_all(&self.sources).await?;

        match self.reaper.cleanup_stale_external_gigs().await {
            Ok(reaped) => {
                if reaped.deleted > 0 || reaped.failed > 0 {
                    info!(
                        "Reaped {} stale gig(s), {} failed",
                        reaped.deleted, reaped.failed
                    );
                }
            }
            Err(e) => error!("Stale gig cleanup failed: {:#}", e),
        }

        let stats = self.reaper.external_gig_stats().await;
        info!("External gig stats: {}", stats);

        Some(report)
    }
}

//! Staleness reaper
//!
//! Deletes tracked records no source has refreshed within the TTL, and
//! reports how fresh the tracked population is.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gigsync_core::domain::GigStats;
use gigsync_core::staleness::StalenessWindow;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::repository::GigRepository;

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReapReport {
    pub candidates: usize,
    pub deleted: usize,
    pub failed: usize,
}

pub struct ReaperService {
    repository: Arc<dyn GigRepository>,
    window: StalenessWindow,
}

impl ReaperService {
    pub fn new(repository: Arc<dyn GigRepository>, window: StalenessWindow) -> Self {
        Self { repository, window }
    }

    /// Deletes every record last scraped before `now - stale_after`
    ///
    /// Fails only when the tracked records cannot be read. Individual delete
    /// failures are counted and the sweep moves on.
    pub async fn cleanup_stale_external_gigs(&self) -> Result<ReapReport> {
        self.sweep(Utc::now()).await
    }

    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<ReapReport> {
        let records = self
            .repository
            .all_external_gigs()
            .await
            .context("Failed to load external gigs for cleanup")?;

        let stale = self.window.select_stale(&records, now);
        let mut report = ReapReport {
            candidates: stale.len(),
            ..ReapReport::default()
        };

        if stale.is_empty() {
            info!("No stale external gigs older than {}", self.window.cutoff(now));
            return Ok(report);
        }

        info!("Removing {} stale external gigs", stale.len());
        for record in stale {
            if self
                .repository
                .delete_gig(&record.source, &record.external_id)
                .await
            {
                report.deleted += 1;
            } else {
                warn!("Could not remove stale gig {}", record.key());
                report.failed += 1;
            }
        }

        info!(
            "Cleanup finished: {} removed, {} failed",
            report.deleted, report.failed
        );
        Ok(report)
    }

    /// Counts of tracked, recently active and stale records
    ///
    /// Returns zeros when the marketplace cannot be read.
    pub async fn external_gig_stats(&self) -> GigStats {
        self.stats_at(Utc::now()).await
    }

    pub async fn stats_at(&self, now: DateTime<Utc>) -> GigStats {
        match self.repository.all_external_gigs().await {
            Ok(records) => self.window.stats(&records, now),
            Err(e) => {
                error!("Failed to compute external gig stats: {:#}", e);
                GigStats::default()
            }
        }
    }
}

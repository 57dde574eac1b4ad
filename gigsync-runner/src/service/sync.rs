//! Sync service
//!
//! Drives one pass over every registered source:
//! - Scraping each source with retry and linear backoff
//! - Refusing to reconcile an empty snapshot
//! - Diffing against tracked records and applying the plan item by item
//!
//! Sources run one after another. One source failing, even on every attempt,
//! never stops the others.

use anyhow::Result;
use chrono::Utc;
use gigsync_core::reconcile;
use gigsync_core::validate::validate_batch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use super::attempt::{RetryPolicy, RunAttempt};
use super::report::{RunReport, SourceReport, SourceStatus, SyncTally};
use crate::repository::GigRepository;
use crate::source::SourceAdapter;

/// Reconciles scraped snapshots into the marketplace
pub struct SyncService {
    repository: Arc<dyn GigRepository>,
    policy: RetryPolicy,
    running: AtomicBool,
}

/// Clears the in-flight flag when a pass ends, however it ends
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SyncService {
    pub fn new(repository: Arc<dyn GigRepository>, policy: RetryPolicy) -> Self {
        Self {
            repository,
            policy,
            running: AtomicBool::new(false),
        }
    }

    /// Runs every source once, in order
    ///
    /// Returns `None` without doing anything when a pass is already in
    /// flight.
    pub async fn run_all(&self, sources: &[Arc<dyn SourceAdapter>]) -> Option<RunReport> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Sync already in progress, skipping this trigger");
            return None;
        }
        let _guard = RunningGuard(&self.running);

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, "Starting sync of {} source(s)", sources.len());

        let mut reports = Vec::with_capacity(sources.len());
        for source in sources {
            let span = info_span!("source", source = source.name());
            let report = self.run_source(source.as_ref()).instrument(span).await;
            reports.push(report);
        }

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            sources: reports,
        };

        let failed = report.failed_sources();
        if failed.is_empty() {
            info!(%run_id, "Sync completed for all sources");
        } else {
            warn!(%run_id, "Sync completed; failed sources: {}", failed.join(", "));
        }

        Some(report)
    }

    /// Runs one source with retries
    async fn run_source(&self, source: &dyn SourceAdapter) -> SourceReport {
        info!("Running source: {}", source.name());
        let mut attempt = RunAttempt::new(self.policy);

        loop {
            let number = attempt.begin();

            match self.sync_once(source).await {
                Ok(tally) => {
                    info!(
                        "Completed {}: {} saved ({} failed), {} deleted ({} failed), {} rejected",
                        source.name(),
                        tally.upserted,
                        tally.upsert_failed,
                        tally.deleted,
                        tally.delete_failed,
                        tally.rejected
                    );
                    return SourceReport {
                        source: source.name().to_string(),
                        attempts: number,
                        status: SourceStatus::Synced,
                        tally,
                    };
                }
                Err(e) => {
                    error!(
                        "Error in {} (attempt {}/{}): {:#}",
                        source.name(),
                        number,
                        attempt.max(),
                        e
                    );
                    attempt.fail(format!("{:#}", e));
                }
            }

            if attempt.exhausted() {
                error!(
                    "Failed to sync {} after {} attempts",
                    source.name(),
                    attempt.number()
                );
                return SourceReport {
                    source: source.name().to_string(),
                    attempts: attempt.number(),
                    status: SourceStatus::Failed {
                        last_error: attempt.last_error().unwrap_or_default().to_string(),
                    },
                    tally: SyncTally::default(),
                };
            }

            let delay = attempt.backoff();
            info!("Retrying {} in {:?}", source.name(), delay);
            tokio::time::sleep(delay).await;
        }
    }

    /// One attempt: scrape, guard, validate, diff, apply
    async fn sync_once(&self, source: &dyn SourceAdapter) -> Result<SyncTally> {
        let scraped = source.scrape().await?;
        info!("Scraped {} listings from {}", scraped.len(), source.name());

        if scraped.is_empty() {
            warn!(
                "No listings from {}; refusing to reconcile an empty snapshot",
                source.name()
            );
            anyhow::bail!("{} returned no listings", source.name());
        }

        let now = Utc::now();
        let mut tally = SyncTally {
            scraped: scraped.len(),
            ..SyncTally::default()
        };

        let report = validate_batch(scraped, now);
        tally.rejected = report.rejected.len();
        for rejection in &report.rejected {
            debug!(
                "Rejected '{}' ({}): {}",
                rejection.listing.title,
                rejection.listing.external_id,
                rejection.reasons()
            );
        }
        if !report.rejected.is_empty() {
            warn!(
                "{} of {} listings from {} failed validation",
                report.rejected.len(),
                tally.scraped,
                source.name()
            );
        }

        if report.valid.is_empty() {
            warn!(
                "No valid listings from {}; refusing to reconcile an empty snapshot",
                source.name()
            );
            anyhow::bail!("{} returned no valid listings", source.name());
        }

        let previous = self.repository.external_gigs(source.name()).await;
        let plan = reconcile::compare(report.valid, &previous);
        debug!(
            "Plan for {}: {} upserts, {} deletes ({} tracked)",
            source.name(),
            plan.to_upsert.len(),
            plan.to_delete.len(),
            previous.len()
        );

        for listing in plan.to_upsert {
            if self.repository.create_or_update_gig(listing, now).await {
                tally.upserted += 1;
            } else {
                tally.upsert_failed += 1;
            }
        }

        for key in &plan.to_delete {
            if self.repository.delete_gig(&key.source, &key.external_id).await {
                tally.deleted += 1;
            } else {
                tally.delete_failed += 1;
            }
        }

        Ok(tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::InMemoryGigRepository;
    use crate::source::scripted::{ScriptedSource, Step, valid_listing};
    use gigsync_core::domain::{GigKey, Listing, TrackedRecord};
    use std::time::Duration;

    fn service(repo: Arc<InMemoryGigRepository>, max_retries: u32) -> SyncService {
        SyncService::new(repo, RetryPolicy::new(max_retries, Duration::ZERO))
    }

    fn tracked(source: &str, ids: &[&str]) -> Vec<TrackedRecord> {
        ids.iter()
            .map(|id| TrackedRecord::new(source, *id).seen_at(Utc::now()))
            .collect()
    }

    fn listings(source: &str, ids: &[&str]) -> Vec<Listing> {
        ids.iter().map(|id| valid_listing(source, id)).collect()
    }

    #[tokio::test]
    async fn test_upserts_current_and_deletes_missing() {
        let repo = Arc::new(InMemoryGigRepository::with_records(tracked("x", &["1", "2"])));
        let source = Arc::new(ScriptedSource::always(
            "x",
            Step::Listings(listings("x", &["2", "3"])),
        ));
        let sources: Vec<Arc<dyn SourceAdapter>> = vec![source];

        let report = service(repo.clone(), 3).run_all(&sources).await.unwrap();

        assert_eq!(repo.upserts(), vec![GigKey::new("x", "2"), GigKey::new("x", "3")]);
        assert_eq!(repo.deletes(), vec![GigKey::new("x", "1")]);
        assert_eq!(repo.ids("x"), vec!["2", "3"]);

        let x = report.source("x").unwrap();
        assert!(x.is_synced());
        assert_eq!(x.attempts, 1);
        assert_eq!(
            x.tally,
            SyncTally {
                scraped: 2,
                rejected: 0,
                upserted: 2,
                upsert_failed: 0,
                deleted: 1,
                delete_failed: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_empty_snapshot_never_deletes() {
        let repo = Arc::new(InMemoryGigRepository::with_records(tracked(
            "x",
            &["1", "2", "3", "4", "5"],
        )));
        let source = Arc::new(ScriptedSource::always("x", Step::Listings(vec![])));
        let sources: Vec<Arc<dyn SourceAdapter>> = vec![source.clone()];

        let report = service(repo.clone(), 3).run_all(&sources).await.unwrap();

        assert!(repo.deletes().is_empty());
        assert!(repo.upserts().is_empty());
        assert!(repo.reads().is_empty());
        assert_eq!(repo.ids("x").len(), 5);
        assert_eq!(source.calls(), 3);

        let x = report.source("x").unwrap();
        assert_eq!(x.attempts, 3);
        assert!(matches!(
            &x.status,
            SourceStatus::Failed { last_error } if last_error.contains("no listings")
        ));
    }

    #[tokio::test]
    async fn test_empty_snapshot_then_recovery() {
        let repo = Arc::new(InMemoryGigRepository::with_records(tracked("x", &["1", "2"])));
        let source = Arc::new(ScriptedSource::new(
            "x",
            vec![Step::Listings(vec![]), Step::Listings(listings("x", &["1"]))],
        ));
        let sources: Vec<Arc<dyn SourceAdapter>> = vec![source.clone()];

        let report = service(repo.clone(), 3).run_all(&sources).await.unwrap();

        let x = report.source("x").unwrap();
        assert!(x.is_synced());
        assert_eq!(x.attempts, 2);
        assert_eq!(repo.deletes(), vec![GigKey::new("x", "2")]);
    }

    #[tokio::test]
    async fn test_all_invalid_snapshot_trips_guard() {
        let repo = Arc::new(InMemoryGigRepository::with_records(tracked("x", &["1", "2"])));
        let source = Arc::new(ScriptedSource::always(
            "x",
            Step::Listings(vec![Listing::new("x", "1"), Listing::new("x", "2")]),
        ));
        let sources: Vec<Arc<dyn SourceAdapter>> = vec![source];

        let report = service(repo.clone(), 2).run_all(&sources).await.unwrap();

        assert!(!report.source("x").unwrap().is_synced());
        assert!(repo.deletes().is_empty());
        assert_eq!(repo.ids("x").len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_listings_are_skipped() {
        let repo = Arc::new(InMemoryGigRepository::new());
        let mut current = listings("x", &["1", "2"]);
        current[1].description = "short".to_string();
        let source = Arc::new(ScriptedSource::always("x", Step::Listings(current)));
        let sources: Vec<Arc<dyn SourceAdapter>> = vec![source];

        let report = service(repo.clone(), 1).run_all(&sources).await.unwrap();

        let x = report.source("x").unwrap();
        assert_eq!(x.tally.rejected, 1);
        assert_eq!(x.tally.upserted, 1);
        assert_eq!(repo.upserts(), vec![GigKey::new("x", "1")]);
    }

    #[tokio::test]
    async fn test_failing_source_does_not_block_others() {
        let repo = Arc::new(InMemoryGigRepository::new());
        let broken = Arc::new(ScriptedSource::always("a", Step::Fail("selector not found")));
        let healthy = Arc::new(ScriptedSource::always(
            "b",
            Step::Listings(listings("b", &["1", "2"])),
        ));
        let sources: Vec<Arc<dyn SourceAdapter>> = vec![broken.clone(), healthy];

        let report = service(repo.clone(), 3).run_all(&sources).await.unwrap();

        assert_eq!(broken.calls(), 3);
        assert_eq!(report.failed_sources(), vec!["a"]);
        assert!(report.source("b").unwrap().is_synced());
        assert_eq!(repo.ids("b"), vec!["1", "2"]);
        assert!(matches!(
            &report.source("a").unwrap().status,
            SourceStatus::Failed { last_error } if last_error.contains("selector not found")
        ));
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let repo = Arc::new(InMemoryGigRepository::new());
        let flaky = Arc::new(ScriptedSource::new(
            "x",
            vec![Step::Fail("timeout"), Step::Listings(listings("x", &["1"]))],
        ));
        let sources: Vec<Arc<dyn SourceAdapter>> = vec![flaky.clone()];

        let report = service(repo.clone(), 3).run_all(&sources).await.unwrap();

        assert_eq!(flaky.calls(), 2);
        assert_eq!(report.source("x").unwrap().attempts, 2);
        assert_eq!(repo.ids("x"), vec!["1"]);
    }

    #[tokio::test]
    async fn test_single_item_failures_do_not_abort_batch() {
        let repo = Arc::new(InMemoryGigRepository::with_records(tracked(
            "x",
            &["old-1", "old-2"],
        )));
        repo.fail_upsert("2");
        repo.fail_delete("old-1");
        let source = Arc::new(ScriptedSource::always(
            "x",
            Step::Listings(listings("x", &["1", "2", "3"])),
        ));
        let sources: Vec<Arc<dyn SourceAdapter>> = vec![source.clone()];

        let report = service(repo.clone(), 3).run_all(&sources).await.unwrap();

        let x = report.source("x").unwrap();
        assert!(x.is_synced());
        assert_eq!(x.attempts, 1);
        assert_eq!(source.calls(), 1);
        assert_eq!(x.tally.upserted, 2);
        assert_eq!(x.tally.upsert_failed, 1);
        assert_eq!(x.tally.deleted, 1);
        assert_eq!(x.tally.delete_failed, 1);
        assert_eq!(repo.upserts().len(), 3);
        assert_eq!(repo.deletes().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_read_deletes_nothing() {
        let repo = Arc::new(InMemoryGigRepository::with_records(tracked("x", &["1", "2"])));
        repo.fail_reads();
        let source = Arc::new(ScriptedSource::always(
            "x",
            Step::Listings(listings("x", &["3"])),
        ));
        let sources: Vec<Arc<dyn SourceAdapter>> = vec![source];

        let report = service(repo.clone(), 1).run_all(&sources).await.unwrap();

        assert!(report.source("x").unwrap().is_synced());
        assert!(repo.deletes().is_empty());
        assert_eq!(repo.upserts(), vec![GigKey::new("x", "3")]);
    }

    #[tokio::test]
    async fn test_upsert_stamps_scrape_time() {
        let repo = Arc::new(InMemoryGigRepository::new());
        let source = Arc::new(ScriptedSource::always(
            "x",
            Step::Listings(listings("x", &["1"])),
        ));
        let sources: Vec<Arc<dyn SourceAdapter>> = vec![source];
        let svc = service(repo.clone(), 1);

        let before = Utc::now();
        svc.run_all(&sources).await.unwrap();
        let first = repo.record("x", "1").unwrap();
        svc.run_all(&sources).await.unwrap();
        let second = repo.record("x", "1").unwrap();

        assert!(first.last_scraped_at.unwrap() >= before);
        assert_eq!(second.first_scraped_at, first.first_scraped_at);
        assert!(second.last_scraped_at >= first.last_scraped_at);
    }

    #[tokio::test]
    async fn test_concurrent_trigger_is_skipped() {
        use async_trait::async_trait;
        use tokio::sync::Notify;

        struct GatedSource {
            entered: Arc<Notify>,
            release: Arc<Notify>,
        }

        #[async_trait]
        impl SourceAdapter for GatedSource {
            fn name(&self) -> &str {
                "gated"
            }

            async fn scrape(&self) -> Result<Vec<Listing>> {
                self.entered.notify_one();
                self.release.notified().await;
                Ok(vec![valid_listing("gated", "1")])
            }
        }

        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let sources: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(GatedSource {
            entered: entered.clone(),
            release: release.clone(),
        })];
        let svc = Arc::new(service(Arc::new(InMemoryGigRepository::new()), 1));

        let first = {
            let svc = svc.clone();
            let sources = sources.clone();
            tokio::spawn(async move { svc.run_all(&sources).await })
        };

        entered.notified().await;
        assert!(svc.run_all(&sources).await.is_none());

        release.notify_one();
        let report = first.await.unwrap();
        assert!(report.is_some());

        // The flag is cleared once the first pass ends
        release.notify_one();
        assert!(svc.run_all(&sources).await.is_some());
    }
}

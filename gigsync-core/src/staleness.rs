//! Staleness window math
//!
//! A record is stale once its `last_scraped_at` is strictly older than
//! `now - stale_after`. A record exactly at the cutoff is kept. Records that
//! were never stamped are never considered stale.

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::{GigStats, TrackedRecord};

/// Default reaper TTL in days
pub const DEFAULT_STALE_AFTER_DAYS: i64 = 14;

/// Default "recently active" window in days
pub const DEFAULT_ACTIVE_WITHIN_DAYS: i64 = 7;

/// Longest window accepted from configuration, in days
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// TTL configuration for the reaper and its statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessWindow {
    pub stale_after: TimeDelta,
    pub active_within: TimeDelta,
}

impl StalenessWindow {
    pub fn new(stale_after: TimeDelta, active_within: TimeDelta) -> Self {
        Self {
            stale_after,
            active_within,
        }
    }

    /// Builds a window from day counts, or `None` if either does not fit a
    /// `TimeDelta`
    pub fn from_days(stale_after_days: i64, active_within_days: i64) -> Option<Self> {
        Some(Self::new(
            TimeDelta::try_days(stale_after_days)?,
            TimeDelta::try_days(active_within_days)?,
        ))
    }

    /// Whether both windows are positive and at most [`MAX_WINDOW_DAYS`]
    pub fn is_bounded(&self) -> bool {
        let max = TimeDelta::days(MAX_WINDOW_DAYS);
        [self.stale_after, self.active_within]
            .iter()
            .all(|window| *window > TimeDelta::zero() && *window <= max)
    }

    /// Records last seen before this instant are stale
    ///
    /// Saturates at the earliest representable instant.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        saturating_sub(now, self.stale_after)
    }

    pub fn is_stale(&self, record: &TrackedRecord, now: DateTime<Utc>) -> bool {
        let cutoff = self.cutoff(now);
        record.last_scraped_at.is_some_and(|seen| seen < cutoff)
    }

    pub fn is_recently_active(&self, record: &TrackedRecord, now: DateTime<Utc>) -> bool {
        let since = saturating_sub(now, self.active_within);
        record.last_scraped_at.is_some_and(|seen| seen >= since)
    }

    /// Stale records, in input order
    pub fn select_stale<'a>(
        &self,
        records: &'a [TrackedRecord],
        now: DateTime<Utc>,
    ) -> Vec<&'a TrackedRecord> {
        records.iter().filter(|r| self.is_stale(r, now)).collect()
    }

    pub fn stats(&self, records: &[TrackedRecord], now: DateTime<Utc>) -> GigStats {
        records.iter().fold(
            GigStats {
                total: records.len(),
                ..GigStats::default()
            },
            |mut stats, record| {
                if self.is_recently_active(record, now) {
                    stats.recently_active += 1;
                } else if self.is_stale(record, now) {
                    stats.stale += 1;
                }
                stats
            },
        )
    }
}

impl Default for StalenessWindow {
    fn default() -> Self {
        Self::new(
            TimeDelta::days(DEFAULT_STALE_AFTER_DAYS),
            TimeDelta::days(DEFAULT_ACTIVE_WITHIN_DAYS),
        )
    }
}

fn saturating_sub(now: DateTime<Utc>, window: TimeDelta) -> DateTime<Utc> {
    now.checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

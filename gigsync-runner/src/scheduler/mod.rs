//! Scheduler layer for the runner
//!
//! Fires sync passes on a fixed interval, or exactly once. Each pass syncs
//! every source, sweeps stale records, then logs freshness statistics.

pub mod trigger;

pub use trigger::SyncScheduler;

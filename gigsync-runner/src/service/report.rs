//! Summaries of sync passes

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// What one successful attempt did to the marketplace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncTally {
    pub scraped: usize,
    pub rejected: usize,
    pub upserted: usize,
    pub upsert_failed: usize,
    pub deleted: usize,
    pub delete_failed: usize,
}

/// Final status of one source in one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Synced,
    Failed { last_error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub source: String,
    pub attempts: u32,
    pub status: SourceStatus,
    pub tally: SyncTally,
}

impl SourceReport {
    pub fn is_synced(&self) -> bool {
        matches!(self.status, SourceStatus::Synced)
    }
}

/// Outcome of one pass over every source
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sources: Vec<SourceReport>,
}

impl RunReport {
    pub fn source(&self, name: &str) -> Option<&SourceReport> {
        self.sources.iter().find(|s| s.source == name)
    }

    pub fn failed_sources(&self) -> Vec<&str> {
        self.sources
            .iter()
            .filter(|s| !s.is_synced())
            .map(|s| s.source.as_str())
            .collect()
    }
}

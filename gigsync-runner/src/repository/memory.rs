//! In-memory GigRepository used by service and scheduler tests

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gigsync_core::domain::{GigKey, Listing, TrackedRecord};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use super::GigRepository;

/// Mirrors the marketplace's upsert/delete semantics and records every call
#[derive(Default)]
pub struct InMemoryGigRepository {
    records: Mutex<BTreeMap<(String, String), TrackedRecord>>,
    upserts: Mutex<Vec<GigKey>>,
    deletes: Mutex<Vec<GigKey>>,
    reads: Mutex<Vec<String>>,
    failing_upserts: Mutex<HashSet<String>>,
    failing_deletes: Mutex<HashSet<String>>,
    failing_reads: Mutex<bool>,
}

impl InMemoryGigRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<TrackedRecord>) -> Self {
        let repo = Self::new();
        {
            let mut stored = repo.records.lock().unwrap();
            for record in records {
                stored.insert((record.source.clone(), record.external_id.clone()), record);
            }
        }
        repo
    }

    /// Upserts of this external id report failure
    pub fn fail_upsert(&self, external_id: &str) {
        self.failing_upserts
            .lock()
            .unwrap()
            .insert(external_id.to_string());
    }

    /// Deletes of this external id report failure
    pub fn fail_delete(&self, external_id: &str) {
        self.failing_deletes
            .lock()
            .unwrap()
            .insert(external_id.to_string());
    }

    /// Every read fails
    pub fn fail_reads(&self) {
        *self.failing_reads.lock().unwrap() = true;
    }

    pub fn upserts(&self) -> Vec<GigKey> {
        self.upserts.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<GigKey> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }

    pub fn record(&self, source: &str, external_id: &str) -> Option<TrackedRecord> {
        self.records
            .lock()
            .unwrap()
            .get(&(source.to_string(), external_id.to_string()))
            .cloned()
    }

    pub fn ids(&self, source: &str) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.source == source)
            .map(|r| r.external_id.clone())
            .collect()
    }
}

#[async_trait]
impl GigRepository for InMemoryGigRepository {
    async fn create_or_update_gig(&self, listing: Listing, scraped_at: DateTime<Utc>) -> bool {
        self.upserts.lock().unwrap().push(listing.key());

        if self.failing_upserts.lock().unwrap().contains(&listing.external_id) {
            return false;
        }

        let mut records = self.records.lock().unwrap();
        let entry = records
            .entry((listing.source.clone(), listing.external_id.clone()))
            .or_insert_with(|| TrackedRecord {
                first_scraped_at: Some(scraped_at),
                ..TrackedRecord::new(listing.source.clone(), listing.external_id.clone())
            });
        entry.title = Some(listing.title);
        entry.last_scraped_at = Some(scraped_at);
        true
    }

    async fn delete_gig(&self, source: &str, external_id: &str) -> bool {
        self.deletes
            .lock()
            .unwrap()
            .push(GigKey::new(source, external_id));

        if self.failing_deletes.lock().unwrap().contains(external_id) {
            return false;
        }

        self.records
            .lock()
            .unwrap()
            .remove(&(source.to_string(), external_id.to_string()));
        true
    }

    async fn external_gigs(&self, source: &str) -> Vec<TrackedRecord> {
        self.reads.lock().unwrap().push(source.to_string());

        if *self.failing_reads.lock().unwrap() {
            return Vec::new();
        }

        self.records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.source == source)
            .cloned()
            .collect()
    }

    async fn all_external_gigs(&self) -> Result<Vec<TrackedRecord>> {
        if *self.failing_reads.lock().unwrap() {
            anyhow::bail!("marketplace unavailable");
        }

        Ok(self.records.lock().unwrap().values().cloned().collect())
    }
}

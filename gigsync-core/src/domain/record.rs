//! Tracked record domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Natural identity of a gig in the marketplace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GigKey {
    pub source: String,
    pub external_id: String,
}

impl GigKey {
    pub fn new(source: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            external_id: external_id.into(),
        }
    }
}

impl std::fmt::Display for GigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.source, self.external_id)
    }
}

/// A listing as the marketplace remembers it
///
/// Owned by the remote store. `first_scraped_at` is set on the first
/// successful upsert and `last_scraped_at` is bumped on every later one.
/// The marketplace serializes records in camelCase and includes many more
/// fields; only the ones reconciliation needs are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedRecord {
    pub external_id: String,
    pub source: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub first_scraped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_scraped_at: Option<DateTime<Utc>>,
}

impl TrackedRecord {
    pub fn new(source: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            source: source.into(),
            title: None,
            first_scraped_at: None,
            last_scraped_at: None,
        }
    }

    /// Sets `last_scraped_at`
    pub fn seen_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_scraped_at = Some(at);
        self
    }

    pub fn key(&self) -> GigKey {
        GigKey::new(self.source.clone(), self.external_id.clone())
    }
}

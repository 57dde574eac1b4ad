//! Listing domain type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::GigKey;

/// A normalized job listing produced by one scrape of one source
///
/// Identity is `(source, external_id)`. Everything else may be defaulted by
/// the adapter that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub external_id: String,
    pub source: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub description: String,
    pub apply_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl Listing {
    /// Creates a listing with adapter defaults for every non-identity field
    pub fn new(source: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            source: source.into(),
            title: "Untitled".to_string(),
            company: "Unknown".to_string(),
            location: "Remote".to_string(),
            job_type: "full-time".to_string(),
            description: String::new(),
            apply_url: String::new(),
            posted_at: None,
            skills: Vec::new(),
            category: "General".to_string(),
            deadline: None,
            budget: None,
            duration: None,
        }
    }

    /// The natural key of this listing
    pub fn key(&self) -> GigKey {
        GigKey::new(self.source.clone(), self.external_id.clone())
    }
}

//! External gig DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Listing;

/// Body of `POST /external-gigs`
///
/// The listing fields are sent flat, in snake_case, next to the moment this
/// scrape observed the listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertGigRequest {
    #[serde(flatten)]
    pub listing: Listing,
    pub last_scraped_at: DateTime<Utc>,
}

impl UpsertGigRequest {
    pub fn new(listing: Listing, scraped_at: DateTime<Utc>) -> Self {
        Self {
            listing,
            last_scraped_at: scraped_at,
        }
    }
}

/// Envelope wrapped around every marketplace response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub count: Option<usize>,
    pub data: Option<T>,
}

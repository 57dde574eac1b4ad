//! External gigs repository
//!
//! Handles communication with the marketplace for listing-related operations:
//! - Upserting scraped listings
//! - Deleting listings that disappeared or went stale
//! - Reading back tracked records for diffing and sweeping

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gigsync_client::MarketplaceClient;
use gigsync_core::domain::{Listing, TrackedRecord};
use gigsync_core::dto::UpsertGigRequest;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Repository trait for marketplace gig operations
#[async_trait]
pub trait GigRepository: Send + Sync {
    /// Creates or updates one gig
    ///
    /// Returns `false` on any failure, including a refusal reported inside a
    /// successful response. Never returns an error.
    ///
    /// # Arguments
    /// * `listing` - The listing to store
    /// * `scraped_at` - When the listing was observed, stored as `lastScrapedAt`
    async fn create_or_update_gig(&self, listing: Listing, scraped_at: DateTime<Utc>) -> bool;

    /// Deletes one gig
    ///
    /// A gig the marketplace no longer knows counts as deleted.
    async fn delete_gig(&self, source: &str, external_id: &str) -> bool;

    /// Tracked records for one source
    ///
    /// Read failures yield an empty list, which makes the next diff delete
    /// nothing.
    async fn external_gigs(&self, source: &str) -> Vec<TrackedRecord>;

    /// Tracked records across every source, bounded by the page size
    async fn all_external_gigs(&self) -> Result<Vec<TrackedRecord>>;
}

/// HTTP implementation of GigRepository
pub struct HttpGigRepository {
    client: Arc<MarketplaceClient>,
    page_size: usize,
}

impl HttpGigRepository {
    /// Creates a new HTTP gig repository
    ///
    /// # Arguments
    /// * `client` - Marketplace API client
    /// * `page_size` - `limit` sent with every list request
    pub fn new(client: Arc<MarketplaceClient>, page_size: usize) -> Self {
        Self { client, page_size }
    }
}

#[async_trait]
impl GigRepository for HttpGigRepository {
    async fn create_or_update_gig(&self, listing: Listing, scraped_at: DateTime<Utc>) -> bool {
        let request = UpsertGigRequest::new(listing, scraped_at);
        let listing = &request.listing;

        match self.client.upsert_gig(&request).await {
            Ok(response) if response.success => {
                debug!(
                    "Saved gig '{}' ({}/{})",
                    listing.title, listing.source, listing.external_id
                );
                true
            }
            Ok(response) => {
                warn!(
                    "Marketplace refused gig {}/{}: {}",
                    listing.source,
                    listing.external_id,
                    response.message.as_deref().unwrap_or("no message")
                );
                false
            }
            Err(e) => {
                error!(
                    "Failed to save gig {}/{}: {}",
                    listing.source, listing.external_id, e
                );
                false
            }
        }
    }

    async fn delete_gig(&self, source: &str, external_id: &str) -> bool {
        match self.client.delete_gig(source, external_id).await {
            Ok(()) => {
                info!("Deleted gig {}/{}", source, external_id);
                true
            }
            Err(e) if e.is_not_found() => {
                debug!("Gig {}/{} already deleted", source, external_id);
                true
            }
            Err(e) => {
                error!("Failed to delete gig {}/{}: {}", source, external_id, e);
                false
            }
        }
    }

    async fn external_gigs(&self, source: &str) -> Vec<TrackedRecord> {
        match self.client.list_gigs_by_source(source, self.page_size).await {
            Ok(records) => records,
            Err(e) => {
                error!("Failed to fetch tracked gigs for {}: {}", source, e);
                Vec::new()
            }
        }
    }

    async fn all_external_gigs(&self) -> Result<Vec<TrackedRecord>> {
        let records = self
            .client
            .list_gigs(self.page_size)
            .await
            .context("Failed to fetch tracked gigs")?;

        if records.len() >= self.page_size {
            warn!(
                "Fetched a full page of {} gigs; records beyond it are not visible this sweep",
                records.len()
            );
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gigsync_client::API_KEY_HEADER;
    use httpmock::prelude::*;
    use serde_json::json;

    fn repository(server: &MockServer) -> HttpGigRepository {
        let client = MarketplaceClient::new(server.base_url(), "test-key");
        HttpGigRepository::new(Arc::new(client), 100)
    }

    fn listing() -> Listing {
        let mut listing = Listing::new("jobberman", "j-1");
        listing.title = "Data Analyst".to_string();
        listing
    }

    #[tokio::test]
    async fn test_upsert_success() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/external-gigs").header(API_KEY_HEADER, "test-key");
                then.status(200).json_body(json!({"success": true}));
            })
            .await;

        assert!(repository(&server).create_or_update_gig(listing(), Utc::now()).await);
    }

    #[tokio::test]
    async fn test_upsert_refusal_is_false() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/external-gigs");
                then.status(200)
                    .json_body(json!({"success": false, "message": "duplicate"}));
            })
            .await;

        assert!(!repository(&server).create_or_update_gig(listing(), Utc::now()).await);
    }

    #[tokio::test]
    async fn test_upsert_server_error_is_false() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/external-gigs");
                then.status(500).body("Server error");
            })
            .await;

        assert!(!repository(&server).create_or_update_gig(listing(), Utc::now()).await);
    }

    #[tokio::test]
    async fn test_delete_not_found_counts_as_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/external-gigs/jobberman/j-1");
                then.status(404)
                    .json_body(json!({"success": false, "message": "External gig not found"}));
            })
            .await;

        assert!(repository(&server).delete_gig("jobberman", "j-1").await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_server_error_is_false() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/external-gigs/jobberman/j-1");
                then.status(502);
            })
            .await;

        assert!(!repository(&server).delete_gig("jobberman", "j-1").await);
    }

    #[tokio::test]
    async fn test_read_failure_yields_empty_list() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/external-gigs").query_param("source", "jobberman");
                then.status(503);
            })
            .await;

        assert!(repository(&server).external_gigs("jobberman").await.is_empty());
    }

    #[tokio::test]
    async fn test_all_external_gigs_propagates_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/external-gigs").query_param("limit", "100");
                then.status(503);
            })
            .await;

        assert!(repository(&server).all_external_gigs().await.is_err());
    }
}

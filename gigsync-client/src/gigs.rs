//! External gig endpoints

use gigsync_core::domain::TrackedRecord;
use gigsync_core::dto::{ApiResponse, UpsertGigRequest};
use tracing::debug;

use crate::error::Result;
use crate::{API_KEY_HEADER, MarketplaceClient};

impl MarketplaceClient {
    // =============================================================================
    // Mutations
    // =============================================================================

    /// Create or update an external gig keyed by `(source, external_id)`
    ///
    /// # Returns
    /// The response envelope; `success` may still be `false` when the
    /// marketplace refused the payload with a 2xx status.
    pub async fn upsert_gig(&self, req: &UpsertGigRequest) -> Result<ApiResponse<serde_json::Value>> {
        let url = self.endpoint(&["external-gigs"])?;
        debug!(
            "POST {} ({}/{})",
            url, req.listing.source, req.listing.external_id
        );

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Delete an external gig
    ///
    /// A gig that is already gone surfaces as a 404 `ApiError`; see
    /// [`crate::ClientError::is_not_found`].
    pub async fn delete_gig(&self, source: &str, external_id: &str) -> Result<()> {
        let url = self.endpoint(&["external-gigs", source, external_id])?;
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    // =============================================================================
    // Queries
    // =============================================================================

    /// List tracked gigs for one source
    ///
    /// # Arguments
    /// * `source` - The source name
    /// * `limit` - Page size requested from the marketplace
    pub async fn list_gigs_by_source(&self, source: &str, limit: usize) -> Result<Vec<TrackedRecord>> {
        let url = self.endpoint(&["external-gigs"])?;
        let limit = limit.to_string();

        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("source", source), ("limit", limit.as_str())])
            .send()
            .await?;

        let envelope: ApiResponse<Vec<TrackedRecord>> = self.handle_response(response).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// List tracked gigs across every source
    ///
    /// # Arguments
    /// * `limit` - Page size requested from the marketplace
    pub async fn list_gigs(&self, limit: usize) -> Result<Vec<TrackedRecord>> {
        let url = self.endpoint(&["external-gigs"])?;

        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("limit", limit)])
            .send()
            .await?;

        let envelope: ApiResponse<Vec<TrackedRecord>> = self.handle_response(response).await?;
        Ok(envelope.data.unwrap_or_default())
    }
}

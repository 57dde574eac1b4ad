//! Gigsync HTTP Client
//!
//! A small, typed HTTP client for the marketplace's `/external-gigs` API.
//!
//! Every request carries the static `X-API-Key` header. Errors are returned to
//! the caller unchanged; deciding which failures are tolerable is the
//! runner's job.
//!
//! # Example
//!
//! ```no_run
//! use gigsync_client::MarketplaceClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = MarketplaceClient::new("http://localhost:5000/api", "secret");
//!
//!     let records = client.list_gigs_by_source("jobberman", 500).await?;
//!     println!("Tracking {} jobberman gigs", records.len());
//!     Ok(())
//! }
//! ```

pub mod error;
mod gigs;

pub use error::{ClientError, Result};

use gigsync_core::dto::ApiResponse;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

/// Header carrying the marketplace API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// HTTP client for the marketplace external gigs API
#[derive(Debug, Clone)]
pub struct MarketplaceClient {
    /// Base URL of the API (e.g., "http://localhost:5000/api")
    base_url: String,
    /// Static key sent with every request
    api_key: String,
    /// HTTP client instance
    client: Client,
}

impl MarketplaceClient {
    /// Create a new marketplace client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the marketplace API
    /// * `api_key` - The key sent in the `X-API-Key` header
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(base_url, api_key, Client::new())
    }

    /// Create a new marketplace client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use gigsync_client::MarketplaceClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = MarketplaceClient::with_client("http://localhost:5000/api", "secret", http_client);
    /// ```
    pub fn with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Get the base URL of the marketplace API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an endpoint URL from path segments
    ///
    /// Segments are percent-encoded, so ids containing `/` or spaces stay
    /// inside their own segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::InvalidRequest(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidRequest(format!("Base URL cannot take a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize the JSON envelope
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<ApiResponse<T>> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is irrelevant (e.g., DELETE operations)
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}

//! JSON feed source
//!
//! Pulls a board that publishes its openings as JSON, either a bare array or
//! wrapped as `{"data": [...]}` / `{"jobs": [...]}`. Items are loosely typed;
//! everything is cleaned through the shared normalization helpers.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gigsync_core::domain::Listing;
use gigsync_core::normalize::{
    absolute_url, clean_text, external_id_from_url, normalize_job_type, split_skills,
};
use serde::Deserialize;
use tracing::debug;

use super::SourceAdapter;

pub struct JsonFeedSource {
    name: String,
    url: String,
    client: reqwest::Client,
}

impl JsonFeedSource {
    pub fn new(name: String, url: String, client: reqwest::Client) -> Self {
        Self { name, url, client }
    }

    /// Converts one feed item, or `None` when it has neither id nor link
    fn to_listing(&self, item: FeedItem) -> Option<Listing> {
        let apply_url = item
            .url
            .as_deref()
            .and_then(|link| absolute_url(&self.url, link))
            .unwrap_or_default();

        let external_id = match item.id.map(|id| clean_text(&id)) {
            Some(id) if !id.is_empty() => id,
            _ if !apply_url.is_empty() => external_id_from_url(&apply_url),
            _ => return None,
        };

        let mut listing = Listing::new(self.name.clone(), external_id);
        listing.apply_url = apply_url;

        if let Some(title) = non_blank(item.title) {
            listing.title = title;
        }
        if let Some(company) = non_blank(item.company) {
            listing.company = company;
        }
        if let Some(location) = non_blank(item.location) {
            listing.location = location;
        }
        if let Some(category) = non_blank(item.category) {
            listing.category = category;
        }
        listing.job_type = normalize_job_type(item.job_type.as_deref().unwrap_or_default()).to_string();
        listing.description = item
            .description
            .map(|d| clean_text(&d))
            .unwrap_or_default();
        listing.posted_at = item.posted_at;
        listing.deadline = item.deadline;
        listing.skills = match item.skills {
            Some(Skills::List(skills)) => skills
                .iter()
                .flat_map(|s| split_skills(s))
                .collect(),
            Some(Skills::Text(text)) => split_skills(&text),
            None => Vec::new(),
        };
        listing.budget = non_blank(item.budget);
        listing.duration = non_blank(item.duration);

        Some(listing)
    }
}

#[async_trait]
impl SourceAdapter for JsonFeedSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn scrape(&self) -> Result<Vec<Listing>> {
        debug!("Fetching feed {} from {}", self.name, self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch feed {}", self.url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Feed {} returned {} - {}", self.url, status, body);
        }

        let payload = response
            .json::<FeedPayload>()
            .await
            .with_context(|| format!("Failed to parse feed {}", self.url))?;

        let items = payload.into_items();
        let total = items.len();
        let listings: Vec<Listing> = items
            .into_iter()
            .filter_map(|item| self.to_listing(item))
            .collect();

        if listings.len() < total {
            debug!(
                "Skipped {} feed item(s) without id or link",
                total - listings.len()
            );
        }
        debug!("Mapped {} listings from feed {}", listings.len(), self.name);

        Ok(listings)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedPayload {
    Items(Vec<FeedItem>),
    Data { data: Vec<FeedItem> },
    Jobs { jobs: Vec<FeedItem> },
}

impl FeedPayload {
    fn into_items(self) -> Vec<FeedItem> {
        match self {
            FeedPayload::Items(items) => items,
            FeedPayload::Data { data } => data,
            FeedPayload::Jobs { jobs } => jobs,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    #[serde(default, alias = "external_id", alias = "externalId")]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default, alias = "jobType", alias = "type")]
    job_type: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "apply_url", alias = "applyUrl", alias = "link")]
    url: Option<String>,
    #[serde(default, alias = "postedAt")]
    posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    skills: Option<Skills>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    budget: Option<String>,
    #[serde(default)]
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Skills {
    List(Vec<String>),
    Text(String),
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| clean_text(&v)).filter(|v| !v.is_empty())
}

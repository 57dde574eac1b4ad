//! Source adapters
//!
//! A source adapter turns one upstream job board into a full snapshot of
//! normalized listings. The sync engine only ever sees this narrow trait;
//! how a source fetches and parses its pages stays behind it.
//!
//! The set of adapters is declared statically in [`build_registry`].

mod demo;
mod feed;
#[cfg(test)]
pub mod scripted;

pub use demo::DemoSource;
pub use feed::JsonFeedSource;

use anyhow::Result;
use async_trait::async_trait;
use gigsync_core::domain::Listing;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;

/// One upstream origin of listings
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable, unique name; also the `source` of every listing it returns
    fn name(&self) -> &str;

    /// Returns the complete current snapshot of this source
    ///
    /// Must not touch shared state. A failure here is retried by the sync
    /// engine.
    async fn scrape(&self) -> Result<Vec<Listing>>;
}

/// Builds the adapter set for this process
///
/// # Arguments
/// * `config` - Runner configuration (demo flag and feed list)
/// * `http` - Shared HTTP client for adapters that fetch over HTTP
pub fn build_registry(
    config: &Config,
    http: &reqwest::Client,
) -> Result<Vec<Arc<dyn SourceAdapter>>> {
    let mut sources: Vec<Arc<dyn SourceAdapter>> = Vec::new();

    for feed in &config.feed_sources {
        sources.push(Arc::new(JsonFeedSource::new(
            feed.name.clone(),
            feed.url.clone(),
            http.clone(),
        )));
    }

    if config.enable_demo_source {
        sources.push(Arc::new(DemoSource::new()));
    }

    {
        let mut names = HashSet::new();
        for source in &sources {
            if !names.insert(source.name()) {
                anyhow::bail!("source '{}' is registered more than once", source.name());
            }
        }
    }

    info!(
        "Loaded {} source(s): {}",
        sources.len(),
        sources
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(sources)
}

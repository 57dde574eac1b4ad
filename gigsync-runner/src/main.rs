//! Gigsync Runner
//!
//! Keeps the marketplace's external gigs in step with upstream job boards.
//!
//! Architecture:
//! - Configuration: environment variables only, with a required API key
//! - Sources: adapters that each return a full snapshot of one job board
//! - Repositories: HTTP communication with the marketplace
//! - Services: reconciliation with retry, and the staleness reaper
//! - Scheduler: interval or run-once triggering
//!
//! Each pass diffs every source's snapshot against what the marketplace
//! already tracks, upserts what is present, deletes what disappeared, then
//! sweeps records no source has refreshed recently.

mod config;
mod repository;
mod scheduler;
mod service;
mod source;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, log_level_from_env};
use crate::repository::{GigRepository, HttpGigRepository};
use crate::scheduler::SyncScheduler;
use crate::service::{ReaperService, RetryPolicy, SyncService};
use gigsync_client::MarketplaceClient;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let level = log_level_from_env();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("gigsync_runner={level},gigsync_client={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Gigsync Runner");

    let config = Config::from_env().context("Invalid configuration")?;
    info!(
        "Loaded configuration: api_url={}, run_mode={:?}, log_level={}",
        config.api_url, config.run_mode, config.log_level
    );

    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let client = Arc::new(MarketplaceClient::with_client(
        config.api_url.clone(),
        config.api_key.clone(),
        http.clone(),
    ));
    let repository: Arc<dyn GigRepository> =
        Arc::new(HttpGigRepository::new(client, config.page_size));

    info!("Marketplace client initialized");

    let sources = source::build_registry(&config, &http)?;
    if sources.is_empty() {
        warn!("No sources registered; set FEED_SOURCES or ENABLE_DEMO_SOURCE");
    }

    let sync = Arc::new(SyncService::new(
        repository.clone(),
        RetryPolicy::from(&config),
    ));
    let reaper = Arc::new(ReaperService::new(repository, config.staleness));

    let scheduler = SyncScheduler::new(
        config.run_mode,
        config.scrape_interval,
        sources,
        sync,
        reaper,
    );

    info!(
        "Runner initialized: interval {:?}, {} retries, {:?} base delay",
        config.scrape_interval, config.max_retries, config.retry_delay
    );

    tokio::select! {
        result = scheduler.run() => {
            if let Err(e) = result {
                error!("Scheduler error: {:#}", e);
                return Err(e);
            }
            info!("Sync finished");
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, stopping");
        }
    }

    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

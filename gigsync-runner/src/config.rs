//! Runner configuration
//!
//! Every setting comes from the environment. The API key is the only value
//! without a default; without it the runner refuses to start.

use anyhow::{Context, Result};
use gigsync_core::staleness::{
    DEFAULT_ACTIVE_WITHIN_DAYS, DEFAULT_STALE_AFTER_DAYS, MAX_WINDOW_DAYS, StalenessWindow,
};
use std::str::FromStr;
use std::time::Duration;

/// Longest accepted scrape interval
const MAX_SCRAPE_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Longest accepted retry base delay
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60 * 60);

/// Longest accepted HTTP request timeout
const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// How scheduler triggers are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Run one pass and exit; restarts are the supervisor's business
    Once,
    /// Run a pass every `scrape_interval`
    Interval,
}

impl FromStr for RunMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "once" => Ok(RunMode::Once),
            "interval" => Ok(RunMode::Interval),
            other => anyhow::bail!("unknown run mode '{}' (expected 'once' or 'interval')", other),
        }
    }
}

/// A JSON feed registered as a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSourceConfig {
    pub name: String,
    pub url: String,
}

/// Runner configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Marketplace API base URL (e.g., "http://localhost:5000/api")
    pub api_url: String,

    /// Static key sent in the `X-API-Key` header
    pub api_key: String,

    /// Period between passes in interval mode
    pub scrape_interval: Duration,

    /// Attempts per source per pass
    pub max_retries: u32,

    /// Backoff base; attempt `n` waits `n * retry_delay`
    pub retry_delay: Duration,

    /// Log verbosity used when `RUST_LOG` is not set
    pub log_level: String,

    pub run_mode: RunMode,

    /// Reaper TTL and the "recently active" window
    pub staleness: StalenessWindow,

    /// Page size for list requests
    pub page_size: usize,

    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,

    /// Register the built-in mock source
    pub enable_demo_source: bool,

    pub feed_sources: Vec<FeedSourceConfig>,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            api_url,
            api_key,
            scrape_interval: Duration::from_secs(6 * 60 * 60),
            max_retries: 3,
            retry_delay: Duration::from_millis(5000),
            log_level: "info".to_string(),
            run_mode: RunMode::Interval,
            staleness: StalenessWindow::default(),
            page_size: 10_000,
            request_timeout: Duration::from_secs(30),
            enable_demo_source: false,
            feed_sources: Vec::new(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - MARKETPLACE_API_KEY (required)
    /// - MARKETPLACE_API_URL (optional, default: http://localhost:5000/api)
    /// - SCRAPE_INTERVAL_HOURS (optional, default: 6)
    /// - MAX_RETRIES (optional, default: 3)
    /// - RETRY_DELAY_MS (optional, default: 5000)
    /// - LOG_LEVEL (optional, default: info)
    /// - RUN_MODE (optional, once|interval, default: interval)
    /// - STALE_AFTER_DAYS (optional, default: 14)
    /// - ACTIVE_WITHIN_DAYS (optional, default: 7)
    /// - PAGE_SIZE (optional, default: 10000)
    /// - REQUEST_TIMEOUT_SECS (optional, default: 30)
    /// - ENABLE_DEMO_SOURCE (optional, default: false)
    /// - FEED_SOURCES (optional, "name=url,name=url")
    pub fn from_env() -> Result<Self> {
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Builds configuration from an arbitrary variable lookup
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("MARKETPLACE_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("MARKETPLACE_API_KEY environment variable not set"))?;

        let api_url =
            lookup("MARKETPLACE_API_URL").unwrap_or_else(|| "http://localhost:5000/api".to_string());

        let mut config = Self::new(api_url, api_key);

        if let Some(hours) = parse_var::<u64, _>(&lookup, "SCRAPE_INTERVAL_HOURS")? {
            let secs = hours
                .checked_mul(60 * 60)
                .with_context(|| format!("SCRAPE_INTERVAL_HOURS is too large: {}", hours))?;
            config.scrape_interval = Duration::from_secs(secs);
        }
        if let Some(retries) = parse_var(&lookup, "MAX_RETRIES")? {
            config.max_retries = retries;
        }
        if let Some(ms) = parse_var(&lookup, "RETRY_DELAY_MS")? {
            config.retry_delay = Duration::from_millis(ms);
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }
        if let Some(mode) = parse_var(&lookup, "RUN_MODE")? {
            config.run_mode = mode;
        }

        let stale_after =
            parse_var(&lookup, "STALE_AFTER_DAYS")?.unwrap_or(DEFAULT_STALE_AFTER_DAYS);
        let active_within =
            parse_var(&lookup, "ACTIVE_WITHIN_DAYS")?.unwrap_or(DEFAULT_ACTIVE_WITHIN_DAYS);
        config.staleness = StalenessWindow::from_days(stale_after, active_within)
            .with_context(|| {
                format!(
                    "STALE_AFTER_DAYS ({}) or ACTIVE_WITHIN_DAYS ({}) is out of range",
                    stale_after, active_within
                )
            })?;

        if let Some(size) = parse_var(&lookup, "PAGE_SIZE")? {
            config.page_size = size;
        }
        if let Some(secs) = parse_var(&lookup, "REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(enabled) = lookup("ENABLE_DEMO_SOURCE") {
            config.enable_demo_source = parse_flag(&enabled);
        }
        if let Some(feeds) = lookup("FEED_SOURCES") {
            config.feed_sources = parse_feed_sources(&feeds)?;
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            anyhow::bail!("api_key cannot be empty");
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!("api_url must start with http:// or https://");
        }

        if self.scrape_interval.is_zero() {
            anyhow::bail!("scrape_interval must be greater than 0");
        }

        if self.scrape_interval > MAX_SCRAPE_INTERVAL {
            anyhow::bail!("scrape_interval must be at most {:?}", MAX_SCRAPE_INTERVAL);
        }

        if self.retry_delay > MAX_RETRY_DELAY {
            anyhow::bail!("retry_delay must be at most {:?}", MAX_RETRY_DELAY);
        }

        if self.max_retries == 0 {
            anyhow::bail!("max_retries must be greater than 0");
        }

        if !self.staleness.is_bounded() {
            anyhow::bail!(
                "stale_after and active_within must be between 1 and {} days",
                MAX_WINDOW_DAYS
            );
        }

        if self.page_size == 0 {
            anyhow::bail!("page_size must be greater than 0");
        }

        if self.request_timeout.is_zero() || self.request_timeout > MAX_REQUEST_TIMEOUT {
            anyhow::bail!("request_timeout must be between 1s and {:?}", MAX_REQUEST_TIMEOUT);
        }

        Ok(())
    }
}

/// Reads `LOG_LEVEL` before the rest of the configuration is loaded
pub fn log_level_from_env() -> String {
    std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("invalid value for {}: '{}'", key, raw)),
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_feed_sources(raw: &str) -> Result<Vec<FeedSourceConfig>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> Result<FeedSourceConfig> {
            let (name, url) = entry
                .split_once('=')
                .with_context(|| format!("feed source '{}' must look like name=url", entry))?;
            let (name, url) = (name.trim(), url.trim());
            if name.is_empty() || url.is_empty() {
                anyhow::bail!("feed source '{}' must look like name=url", entry);
            }
            Ok(FeedSourceConfig {
                name: name.to_string(),
                url: url.to_string(),
            })
        })
        .collect()
}

//! Per-source retry bookkeeping

use std::time::Duration;

use crate::config::Config;

/// How many times a source is tried per pass, and how long to wait between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }
}

impl From<&Config> for RetryPolicy {
    fn from(config: &Config) -> Self {
        Self::new(config.max_retries, config.retry_delay)
    }
}

/// Retry state for one source within one pass
#[derive(Debug, Clone)]
pub struct RunAttempt {
    policy: RetryPolicy,
    number: u32,
    last_error: Option<String>,
}

impl RunAttempt {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            number: 0,
            last_error: None,
        }
    }

    /// Starts the next attempt and returns its 1-based number
    pub fn begin(&mut self) -> u32 {
        self.number += 1;
        self.number
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
    }

    /// Attempts made so far
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn max(&self) -> u32 {
        self.policy.max_retries
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn exhausted(&self) -> bool {
        self.number >= self.policy.max_retries
    }

    /// Delay before the next attempt: `base_delay × attempts made`
    pub fn backoff(&self) -> Duration {
        self.policy.base_delay * self.number
    }
}

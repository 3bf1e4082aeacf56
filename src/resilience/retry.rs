// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Retry with exponential backoff for index engine writes.
//!
//! # Example
//!
//! ```
//! use catalog_search::RetryConfig;
//! use std::time::Duration;
//!
//! // Index build: a handful of attempts, then surface the error
//! let build = RetryConfig::build();
//! assert_eq!(build.max_retries, Some(5));
//!
//! // Background reindex: patient, but bounded
//! let reindex = RetryConfig::reindex();
//! assert_eq!(reindex.max_retries, Some(8));
//!
//! // No waiting at all
//! let immediate = RetryConfig::immediate(2);
//! assert_eq!(immediate.initial_delay, Duration::ZERO);
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

/// Backoff schedule for a retried operation.
///
/// `max_retries` counts attempts, so `Some(1)` means no retry at all.
/// `None` retries forever.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub factor: f64,
    pub max_retries: Option<usize>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::reindex()
    }
}

impl RetryConfig {
    /// Initial index creation and bulk ingestion.
    #[must_use]
    pub fn build() -> Self {
        Self {
            max_retries: Some(5),
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
            factor: 2.0,
        }
    }

    /// Background document refresh. Gives the engine about a minute to come back.
    #[must_use]
    pub fn reindex() -> Self {
        Self {
            max_retries: Some(8),
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(30),
            factor: 2.0,
        }
    }

    /// `attempts` tries with no delay in between
    #[must_use]
    pub fn immediate(attempts: usize) -> Self {
        Self {
            max_retries: Some(attempts.max(1)),
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            factor: 1.0,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    #[must_use]
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let mut delay = self.initial_delay;
        for _ in 1..attempt {
            delay = delay.mul_f64(self.factor).min(self.max_delay);
        }
        delay.min(self.max_delay)
    }
}

/// Run `operation` until it succeeds or the attempt budget is spent.
///
/// Returns the last error when giving up.
pub async fn retry<F, Fut, T, E>(
    operation_name: &str,
    config: &RetryConfig,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempts = 0;

    loop {
        match operation().await {
            Ok(val) => {
                if attempts > 0 {
                    info!(operation = operation_name, retries = attempts, "Operation succeeded after retry");
                }
                return Ok(val);
            }
            Err(err) => {
                attempts += 1;
                let delay = config.delay_for(attempts);

                match config.max_retries {
                    Some(max) if attempts >= max => {
                        warn!(operation = operation_name, attempts, error = %err, "Giving up");
                        return Err(err);
                    }
                    Some(max) => {
                        warn!(operation = operation_name, attempt = attempts, max, error = %err, ?delay, "Operation failed, retrying");
                    }
                    None => {
                        warn!(operation = operation_name, attempt = attempts, error = %err, ?delay, "Operation failed, will retry forever");
                    }
                }

                sleep(delay).await;
            }
        }
    }
}
